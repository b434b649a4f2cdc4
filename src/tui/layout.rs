use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::config::ColorConfig;
use crate::domain::DisplayPost;
use crate::normalizer::html_to_text;
use crate::tui::app::{FooterRow, InputMode, TuiApp};

/// Excerpt preview length in the list, in characters.
const EXCERPT_PREVIEW: usize = 120;

pub fn render(frame: &mut Frame, app: &mut TuiApp, colors: &ColorConfig, base_url: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),    // Main view
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    if let Some(post) = app.state.selected_post.clone() {
        render_detail(frame, app, &post, chunks[0], colors, base_url);
    } else if app.state.is_blocking_error() && !app.state.is_loading {
        render_error_view(frame, app, chunks[0], colors);
    } else {
        render_list(frame, app, chunks[0], colors);
    }
    render_status_bar(frame, app, chunks[1], colors);
}

fn render_list(frame: &mut Frame, app: &mut TuiApp, area: Rect, colors: &ColorConfig) {
    let mut items: Vec<ListItem> = app
        .visible_posts()
        .into_iter()
        .map(|post| post_list_item(post, colors))
        .collect();

    match app.footer() {
        Some(FooterRow::Loading) => items.push(ListItem::new("Loading...")),
        Some(FooterRow::Retry(error)) => items.push(
            ListItem::new(format!("Error: {}  [Enter/r to retry]", error))
                .style(Style::default().fg(colors.error)),
        ),
        Some(FooterRow::LoadMore) => items.push(ListItem::new("Load more")),
        None if app.state.posts.is_empty() => items.push(ListItem::new("No posts")),
        None => {}
    }

    let visible = app.visible_posts().len();
    let title = if app.search_query.is_empty() {
        format!(" Posts ({}) ", visible)
    } else {
        format!(
            " Posts ({} of {}) matching \"{}\" ",
            visible,
            app.state.posts.len(),
            app.search_query
        )
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.border));

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(colors.selection_bg)
                .fg(colors.selection_fg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn post_list_item<'a>(post: &DisplayPost, colors: &ColorConfig) -> ListItem<'a> {
    let title = Line::from(vec![
        Span::styled(
            format!("{:<12} ", post.formatted_date()),
            Style::default().fg(colors.metadata_date),
        ),
        Span::styled(
            post.display_title(),
            Style::default()
                .fg(colors.post_title)
                .add_modifier(Modifier::BOLD),
        ),
    ]);
    let excerpt = Line::from(Span::styled(
        format!("             {}", truncate(&post.excerpt, EXCERPT_PREVIEW)),
        Style::default().fg(colors.post_excerpt),
    ));
    ListItem::new(Text::from(vec![title, excerpt]))
}

fn render_error_view(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let error = app.state.error.as_deref().unwrap_or_default();
    let text = Text::from(vec![
        Line::from(""),
        Line::from(Span::styled(
            "Couldn't load posts",
            Style::default()
                .fg(colors.error)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(error.to_string()),
        Line::from(""),
        Line::from("Press r to retry"),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.error));

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

fn render_detail(
    frame: &mut Frame,
    app: &TuiApp,
    post: &DisplayPost,
    area: Rect,
    colors: &ColorConfig,
    base_url: &str,
) {
    let mut lines = vec![
        Line::from(Span::styled(
            post.display_title(),
            Style::default()
                .fg(colors.post_title)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            post.formatted_date(),
            Style::default().fg(colors.metadata_date),
        )),
    ];
    if post.has_image() {
        lines.push(Line::from(Span::styled(
            format!("Image: {}", post.image_url),
            Style::default().fg(colors.metadata_image),
        )));
    }
    lines.push(Line::from(Span::styled(
        format!("Link: {}", post.permalink(base_url)),
        Style::default().fg(colors.metadata_link),
    )));
    lines.push(Line::from(""));
    lines.push(Line::from("─".repeat(area.width.saturating_sub(2) as usize)));
    lines.push(Line::from(""));

    let body = html_to_text(&post.content);
    let body = if body.is_empty() { post.excerpt.clone() } else { body };
    lines.push(Line::from(body));

    let block = Block::default()
        .title(format!(" {} ", post.display_title()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.border));

    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll, 0));

    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let (status, style) = if app.input_mode == InputMode::Search {
        (
            format!("Search: {}_  (Enter:Keep  Esc:Clear)", app.search_query),
            Style::default().fg(colors.search).bg(colors.status_bg),
        )
    } else {
        let text = if let Some(ref msg) = app.status_message {
            msg.clone()
        } else if app.in_detail() {
            "j/k:Scroll  o:Open in browser  Esc:Back  q:Quit".to_string()
        } else {
            "j/k:Nav  Enter:Open  n:More  R:Refresh  r:Retry  /:Search  o:Browser  q:Quit"
                .to_string()
        };
        (
            text,
            Style::default().fg(colors.status_fg).bg(colors.status_bg),
        )
    };

    frame.render_widget(Paragraph::new(status).style(style), area);
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PaginationState;
    use ratatui::{backend::TestBackend, Terminal};

    fn post(id: u64, title: &str) -> DisplayPost {
        DisplayPost {
            id,
            title: title.to_string(),
            excerpt: "Short text".into(),
            date: "2024-02-10T09:00:00".into(),
            image_url: String::new(),
            slug: format!("post-{id}"),
            content: "<p>Full body</p>".into(),
        }
    }

    fn draw(app: &mut TuiApp) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal
            .draw(|frame| render(frame, app, &ColorConfig::default(), "https://savebucks.us/"))
            .unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long excerpt", 10), "a very...");
    }

    #[test]
    fn test_full_screen_error_when_empty() {
        let mut app = TuiApp::new();
        app.set_state(PaginationState {
            error: Some("dns failure".into()),
            ..Default::default()
        });
        let screen = draw(&mut app);
        assert!(screen.contains("Couldn't load posts"));
        assert!(screen.contains("dns failure"));
    }

    #[test]
    fn test_inline_retry_row_with_data() {
        let mut app = TuiApp::new();
        app.set_state(PaginationState {
            posts: vec![post(1, "First deal")],
            error: Some("timeout".into()),
            page: 2,
            ..Default::default()
        });
        let screen = draw(&mut app);
        assert!(screen.contains("First deal"));
        assert!(screen.contains("Error: timeout"));
        assert!(!screen.contains("Couldn't load posts"));
    }

    #[test]
    fn test_detail_view() {
        let mut app = TuiApp::new();
        app.set_state(PaginationState {
            posts: vec![post(1, "First deal")],
            selected_post: Some(post(1, "First deal")),
            ..Default::default()
        });
        let screen = draw(&mut app);
        assert!(screen.contains("Feb 10, 2024"));
        assert!(screen.contains("https://savebucks.us/post-1"));
        assert!(screen.contains("Full body"));
    }
}
