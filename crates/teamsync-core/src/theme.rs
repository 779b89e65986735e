//! Chart theme for the site's Vega-Lite charts.
//!
//! The theme is a plain value handed to whatever renders a chart; nothing is
//! registered globally. [`ChartTheme::apply`] stamps it into a chart spec's
//! `config` block without overriding settings the chart already makes.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartTheme {
    pub name: String,
    pub font: String,
    /// Stylesheet URL that makes `font` available in the page.
    pub font_stylesheet: String,
    pub mark_color: String,
    pub title: TitleStyle,
    pub axis: AxisStyle,
    pub legend: LegendStyle,
    pub view: ViewStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleStyle {
    pub font_size: u32,
    pub anchor: String,
    pub color: String,
    pub font_weight: u32,
    pub dx: i32,
    pub dy: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisStyle {
    pub label_font_size: u32,
    pub title_font_size: u32,
    pub x_label_angle: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegendStyle {
    pub label_font_size: u32,
    pub title_font_size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewStyle {
    pub width: u32,
    pub height: u32,
    pub padding: Padding,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Padding {
    pub top: u32,
    pub left: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self {
            name: "poppins_theme".to_string(),
            font: "Poppins".to_string(),
            font_stylesheet:
                "https://fonts.googleapis.com/css2?family=Poppins:wght@400;700&display=swap"
                    .to_string(),
            mark_color: "purple".to_string(),
            title: TitleStyle::default(),
            axis: AxisStyle::default(),
            legend: LegendStyle::default(),
            view: ViewStyle::default(),
        }
    }
}

impl Default for TitleStyle {
    fn default() -> Self {
        Self {
            font_size: 20,
            anchor: "middle".to_string(),
            color: "black".to_string(),
            font_weight: 400,
            dx: 10,
            dy: -20,
        }
    }
}

impl Default for AxisStyle {
    fn default() -> Self {
        Self {
            label_font_size: 14,
            title_font_size: 14,
            x_label_angle: 0,
        }
    }
}

impl Default for LegendStyle {
    fn default() -> Self {
        Self {
            label_font_size: 12,
            title_font_size: 14,
        }
    }
}

impl Default for ViewStyle {
    fn default() -> Self {
        Self {
            width: 600,
            height: 300,
            padding: Padding::default(),
        }
    }
}

impl Default for Padding {
    fn default() -> Self {
        Self {
            top: 190,
            left: 10,
            right: 10,
            bottom: 90,
        }
    }
}

impl ChartTheme {
    /// Load a theme from YAML. Missing keys keep their default values.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&data)?)
    }

    /// The Vega-Lite `config` block for this theme.
    pub fn to_vega_config(&self) -> Value {
        json!({
            "title": {
                "fontSize": self.title.font_size,
                "font": self.font,
                "anchor": self.title.anchor,
                "color": self.title.color,
                "fontWeight": self.title.font_weight,
                "dy": self.title.dy,
                "dx": self.title.dx,
            },
            "axis": {
                "labelFontSize": self.axis.label_font_size,
                "titleFontSize": self.axis.title_font_size,
                "titleFont": self.font,
                "labelFont": self.font,
            },
            "axisX": { "labelAngle": self.axis.x_label_angle },
            "legend": {
                "labelFontSize": self.legend.label_font_size,
                "titleFontSize": self.legend.title_font_size,
                "titleFont": self.font,
                "labelFont": self.font,
            },
            "bar": { "color": self.mark_color, "fill": self.mark_color },
            "line": { "color": self.mark_color },
            "view": {
                "height": self.view.height,
                "width": self.view.width,
                "padding": {
                    "top": self.view.padding.top,
                    "left": self.view.padding.left,
                    "right": self.view.padding.right,
                    "bottom": self.view.padding.bottom,
                },
            },
        })
    }

    /// Merge the theme into `chart["config"]`. Keys the chart already sets
    /// are left alone. A non-object chart is replaced by an object holding
    /// only the config.
    pub fn apply(&self, chart: &mut Value) {
        if !chart.is_object() {
            *chart = Value::Object(Map::new());
        }
        if let Value::Object(map) = chart {
            let config = map
                .entry("config")
                .or_insert_with(|| Value::Object(Map::new()));
            fill_missing(config, &self.to_vega_config());
        }
    }

    /// HTML `<link>` tag that loads the theme font.
    pub fn font_stylesheet_link(&self) -> String {
        format!(r#"<link href="{}" rel="stylesheet">"#, self.font_stylesheet)
    }
}

fn fill_missing(target: &mut Value, defaults: &Value) {
    match (target, defaults) {
        (Value::Object(target), Value::Object(defaults)) => {
            for (key, value) in defaults {
                match target.get_mut(key) {
                    Some(existing) => fill_missing(existing, value),
                    None => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        // Scalars and arrays already present win.
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_matches_site_style() {
        let config = ChartTheme::default().to_vega_config();
        assert_eq!(config["title"]["font"], "Poppins");
        assert_eq!(config["title"]["anchor"], "middle");
        assert_eq!(config["title"]["dy"], -20);
        assert_eq!(config["axis"]["labelFontSize"], 14);
        assert_eq!(config["axisX"]["labelAngle"], 0);
        assert_eq!(config["bar"]["fill"], "purple");
        assert_eq!(config["view"]["width"], 600);
        assert_eq!(config["view"]["height"], 300);
        assert_eq!(config["view"]["padding"]["top"], 190);
        assert_eq!(config["view"]["padding"]["bottom"], 90);
    }

    #[test]
    fn apply_keeps_chart_overrides() {
        let mut chart = json!({
            "mark": "bar",
            "config": { "view": { "width": 800 }, "bar": "not-an-object" }
        });
        ChartTheme::default().apply(&mut chart);
        assert_eq!(chart["mark"], "bar");
        assert_eq!(chart["config"]["view"]["width"], 800);
        assert_eq!(chart["config"]["view"]["height"], 300);
        assert_eq!(chart["config"]["bar"], "not-an-object");
        assert_eq!(chart["config"]["legend"]["labelFont"], "Poppins");
    }

    #[test]
    fn apply_is_independent_per_chart() {
        let purple = ChartTheme::default();
        let teal = ChartTheme {
            mark_color: "teal".to_string(),
            ..ChartTheme::default()
        };
        let mut a = json!({});
        let mut b = json!({});
        purple.apply(&mut a);
        teal.apply(&mut b);
        assert_eq!(a["config"]["line"]["color"], "purple");
        assert_eq!(b["config"]["line"]["color"], "teal");
    }

    #[test]
    fn load_partial_yaml_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("theme.yaml");
        std::fs::write(&path, "font: Inter\nview:\n  width: 720\n").unwrap();
        let theme = ChartTheme::load(&path).unwrap();
        assert_eq!(theme.font, "Inter");
        assert_eq!(theme.view.width, 720);
        assert_eq!(theme.view.height, 300);
        assert_eq!(theme.view.padding.top, 190);
        assert_eq!(theme.mark_color, "purple");
    }

    #[test]
    fn font_link_points_at_stylesheet() {
        let link = ChartTheme::default().font_stylesheet_link();
        assert!(link.starts_with("<link href=\"https://fonts.googleapis.com/css2?family=Poppins"));
        assert!(link.ends_with("rel=\"stylesheet\">"));
    }
}
