use ratatui::widgets::ListState;

use crate::domain::{DisplayPost, PaginationState};
use crate::tui::event::Action;

pub const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
}

/// The row under the list, mirroring what the feed is doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FooterRow {
    Loading,
    Retry(String),
    LoadMore,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row<'a> {
    Post(&'a DisplayPost),
    Footer(FooterRow),
}

/// Work for the run loop: feed commands and side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    LoadNext,
    Refresh,
    Retry,
    Select(DisplayPost),
    Clear,
    Open(DisplayPost),
}

pub struct TuiApp {
    /// Latest snapshot from the feed.
    pub state: PaginationState,
    pub input_mode: InputMode,
    pub search_query: String,
    pub cursor: usize,
    pub list_state: ListState,
    pub detail_scroll: u16,
    pub should_quit: bool,
    pub status_message: Option<String>,
}

impl TuiApp {
    pub fn new() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));

        Self {
            state: PaginationState::default(),
            input_mode: InputMode::Normal,
            search_query: String::new(),
            cursor: 0,
            list_state,
            detail_scroll: 0,
            should_quit: false,
            status_message: None,
        }
    }

    /// Take a new snapshot, keeping the cursor inside the list.
    pub fn set_state(&mut self, state: PaginationState) {
        let was_detail = self.state.selected_post.is_some();
        self.state = state;
        if self.state.selected_post.is_some() && !was_detail {
            self.detail_scroll = 0;
        }
        self.clamp_cursor();
    }

    pub fn in_detail(&self) -> bool {
        self.state.selected_post.is_some()
    }

    pub fn visible_posts(&self) -> Vec<&DisplayPost> {
        self.state
            .posts
            .iter()
            .filter(|post| post.matches_query(&self.search_query))
            .collect()
    }

    pub fn footer(&self) -> Option<FooterRow> {
        if self.state.is_loading {
            Some(FooterRow::Loading)
        } else if let Some(error) = &self.state.error {
            Some(FooterRow::Retry(error.clone()))
        } else if self.state.has_more_posts {
            Some(FooterRow::LoadMore)
        } else {
            None
        }
    }

    pub fn row_count(&self) -> usize {
        self.visible_posts().len() + usize::from(self.footer().is_some())
    }

    pub fn selected_row(&self) -> Option<Row<'_>> {
        let posts = self.visible_posts();
        match posts.get(self.cursor) {
            Some(post) => Some(Row::Post(*post)),
            None if self.cursor == posts.len() => self.footer().map(Row::Footer),
            None => None,
        }
    }

    pub fn handle_action(&mut self, action: Action) -> Option<Command> {
        self.status_message = None;

        if let Some(post) = self.state.selected_post.clone() {
            return self.handle_detail_action(action, post);
        }

        match action {
            Action::Quit => self.should_quit = true,
            Action::MoveUp => self.move_cursor(-1),
            Action::MoveDown => self.move_cursor(1),
            Action::PrevPage => self.move_cursor(-(PAGE_SIZE as isize)),
            Action::NextPage => self.move_cursor(PAGE_SIZE as isize),
            Action::Select => {
                return match self.selected_row()? {
                    Row::Post(post) => Some(Command::Select(post.clone())),
                    Row::Footer(FooterRow::LoadMore) => Some(Command::LoadNext),
                    Row::Footer(FooterRow::Retry(_)) => Some(Command::Retry),
                    Row::Footer(FooterRow::Loading) => None,
                };
            }
            Action::Back => {
                if !self.search_query.is_empty() {
                    self.clear_search();
                }
            }
            Action::Refresh => {
                self.cursor = 0;
                self.list_state.select(Some(0));
                return Some(Command::Refresh);
            }
            Action::LoadMore => {
                if !self.state.is_loading && self.state.has_more_posts {
                    return Some(Command::LoadNext);
                }
                if !self.state.has_more_posts {
                    self.status_message = Some("No more posts".to_string());
                }
            }
            Action::Retry => {
                if self.state.error.is_some() && !self.state.is_loading {
                    return Some(Command::Retry);
                }
            }
            Action::Search => {
                self.input_mode = InputMode::Search;
            }
            Action::OpenInBrowser => {
                if let Some(Row::Post(post)) = self.selected_row() {
                    return Some(Command::Open(post.clone()));
                }
            }
            Action::None => {}
        }
        None
    }

    fn handle_detail_action(&mut self, action: Action, post: DisplayPost) -> Option<Command> {
        match action {
            Action::Quit => self.should_quit = true,
            Action::Back => return Some(Command::Clear),
            Action::MoveUp => self.detail_scroll = self.detail_scroll.saturating_sub(1),
            Action::MoveDown => self.detail_scroll = self.detail_scroll.saturating_add(1),
            Action::PrevPage => {
                self.detail_scroll = self.detail_scroll.saturating_sub(PAGE_SIZE as u16)
            }
            Action::NextPage => {
                self.detail_scroll = self.detail_scroll.saturating_add(PAGE_SIZE as u16)
            }
            Action::OpenInBrowser | Action::Select => return Some(Command::Open(post)),
            _ => {}
        }
        None
    }

    pub fn push_search_char(&mut self, c: char) {
        self.search_query.push(c);
        self.reset_cursor();
    }

    pub fn pop_search_char(&mut self) {
        self.search_query.pop();
        self.reset_cursor();
    }

    /// Leave search mode but keep filtering.
    pub fn finish_search(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn clear_search(&mut self) {
        self.input_mode = InputMode::Normal;
        self.search_query.clear();
        self.reset_cursor();
    }

    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
    }

    fn move_cursor(&mut self, delta: isize) {
        let max_index = self.row_count().saturating_sub(1);
        let target = self.cursor.saturating_add_signed(delta).min(max_index);
        self.cursor = target;
        self.list_state.select(Some(self.cursor));
    }

    fn reset_cursor(&mut self) {
        self.cursor = 0;
        self.list_state.select(Some(0));
    }

    fn clamp_cursor(&mut self) {
        let max_index = self.row_count().saturating_sub(1);
        if self.cursor > max_index {
            self.cursor = max_index;
        }
        self.list_state.select(Some(self.cursor));
    }
}

impl Default for TuiApp {
    fn default() -> Self {
        Self::new()
    }
}
