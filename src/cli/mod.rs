pub mod commands;

use clap::{Parser, Subcommand};

use crate::config::SiteConfig;

#[derive(Parser)]
#[command(name = "wpreader")]
#[command(about = "A terminal reader for WordPress blogs", long_about = None)]
pub struct Cli {
    /// Site to read, overriding site.base_url from the config file
    #[arg(short, long, global = true)]
    pub site: Option<String>,

    /// Posts per request (1-100), overriding site.per_page
    #[arg(short = 'n', long, global = true)]
    pub per_page: Option<u32>,

    /// Defaults to `tui`
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Print one page of posts
    List {
        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Print display posts as JSON
        #[arg(long)]
        json: bool,
    },
    /// Find a post by slug and print it
    Show {
        /// Post slug, as in https://example.com/<slug>
        slug: String,
    },
    /// Open a post in the default browser
    Open {
        /// Post slug
        slug: String,
    },
    /// Launch the TUI
    Tui,
}

impl Cli {
    /// Whether this run takes over the terminal with the TUI.
    pub fn is_interactive(&self) -> bool {
        matches!(self.command, None | Some(Commands::Tui))
    }

    /// Apply command-line overrides on top of the file config.
    pub fn apply_overrides(&self, site: &mut SiteConfig) {
        if let Some(url) = &self.site {
            site.base_url = url.clone();
        }
        if let Some(per_page) = self.per_page {
            site.per_page = per_page;
        }
    }
}
