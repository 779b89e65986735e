use crate::output::print_json;
use anyhow::Context;
use std::path::Path;
use teamsync_core::{config::Config, theme::ChartTheme};

pub fn run(root: &Path, apply: Option<&Path>, font_link: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load teamsync.yaml")?;
    let theme = match &config.theme {
        Some(path) => {
            let path = root.join(path);
            ChartTheme::load(&path)
                .with_context(|| format!("failed to load theme from {}", path.display()))?
        }
        None => ChartTheme::default(),
    };

    if font_link {
        println!("{}", theme.font_stylesheet_link());
        return Ok(());
    }

    match apply {
        Some(chart_path) => {
            let data = std::fs::read_to_string(chart_path)
                .with_context(|| format!("failed to read {}", chart_path.display()))?;
            let mut chart: serde_json::Value = serde_json::from_str(&data)
                .with_context(|| format!("{} is not valid JSON", chart_path.display()))?;
            theme.apply(&mut chart);
            print_json(&chart)
        }
        None => print_json(&theme.to_vega_config()),
    }
}
