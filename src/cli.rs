use clap::Parser;

use crate::config::{AppConfig, ImageFormat};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Path to config TOML
    #[arg(long, default_value = "tau_align.toml")]
    pub config: String,

    /// Ensemble directory holding <tag>_tau_delay.csv (overrides config)
    #[arg(long)]
    pub base_dir: Option<String>,

    /// Run tag, e.g. N10 (overrides config)
    #[arg(long)]
    pub tag: Option<String>,

    /// Steps kept before each event (overrides config)
    #[arg(long)]
    pub win_pre: Option<usize>,

    /// Steps kept after each event (overrides config)
    #[arg(long)]
    pub win_post: Option<usize>,

    /// Output directory for charts (defaults to the base directory)
    #[arg(long)]
    pub out_dir: Option<String>,

    /// Chart image format
    #[arg(long, value_enum)]
    pub format: Option<ImageFormat>,

    /// Skip writing the aggregate CSVs
    #[arg(long, default_value_t = false)]
    pub no_csv: bool,
}

impl Args {
    pub fn apply(&self, cfg: &mut AppConfig) {
        if let Some(base_dir) = &self.base_dir {
            cfg.paths.base_dir = base_dir.clone();
        }
        if let Some(tag) = &self.tag {
            cfg.paths.run_tag = tag.clone();
        }
        if let Some(pre) = self.win_pre {
            cfg.window.pre = pre;
        }
        if let Some(post) = self.win_post {
            cfg.window.post = post;
        }
        if let Some(out_dir) = &self.out_dir {
            cfg.paths.out_dir = Some(out_dir.clone());
        }
        if let Some(format) = self.format {
            cfg.output.format = format;
        }
        if self.no_csv {
            cfg.output.write_csv = false;
        }
    }
}
