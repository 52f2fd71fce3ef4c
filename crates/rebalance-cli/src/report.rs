//! Benchmark outputs: fold score table, JSON summary and HTML report.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use maud::{html, Markup, PreEscaped, DOCTYPE};
use plotly::common::Mode;
use plotly::layout::{Axis, Layout};
use plotly::{Plot, Scatter};
use serde::Serialize;

use rebalance_classifiers::metrics::Stat;

use crate::benchmark::{BenchmarkResults, StrategySummary};
use crate::config::BenchmarkConfig;

pub const SCORES_FILE: &str = "rebalance_scores.tsv";
pub const SUMMARY_FILE: &str = "rebalance_summary.json";
pub const REPORT_FILE: &str = "rebalance_report.html";

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.12.1.min.js";

/// A titled block of HTML content and plots.
pub struct ReportSection {
    title: String,
    content: Vec<Markup>,
}

impl ReportSection {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            content: Vec::new(),
        }
    }

    pub fn add_content(&mut self, markup: Markup) {
        self.content.push(markup);
    }

    pub fn add_plot(&mut self, plot: Plot) {
        let id = format!(
            "plot-{}-{}",
            self.title.to_lowercase().replace(|c: char| !c.is_alphanumeric(), "-"),
            self.content.len()
        );
        self.content
            .push(html! { div class="plot" { (PreEscaped(plot.to_inline_html(Some(id.as_str())))) } });
    }

    fn render(&self) -> Markup {
        html! {
            section {
                h2 { (self.title) }
                @for block in &self.content {
                    (block)
                }
            }
        }
    }
}

/// Single-page HTML report.
pub struct Report {
    title: String,
    version: String,
    generated_at: String,
    sections: Vec<ReportSection>,
}

impl Report {
    pub fn new(title: &str, version: &str) -> Self {
        Self {
            title: title.to_string(),
            version: version.to_string(),
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            sections: Vec::new(),
        }
    }

    pub fn add_section(&mut self, section: ReportSection) {
        self.sections.push(section);
    }

    pub fn render(&self) -> Markup {
        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="utf-8";
                    title { (self.title) }
                    script src=(PLOTLY_CDN) {}
                    style {
                        "body { font-family: sans-serif; margin: 2em; }
                        table { border-collapse: collapse; margin-bottom: 1em; }
                        th, td { border: 1px solid #ccc; padding: 4px 8px; text-align: right; }
                        th:first-child, td:first-child { text-align: left; }
                        .plot { display: inline-block; width: 48%; min-width: 420px; }
                        .code-container { background-color: #f5f5f5; padding: 10px; border-radius: 5px; overflow-x: auto; font-family: monospace; white-space: pre-wrap; }"
                    }
                }
                body {
                    h1 { (self.title) }
                    p { "rebalance " (self.version) ", generated " (self.generated_at) }
                    @for section in &self.sections {
                        (section.render())
                    }
                }
            }
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(&path, self.render().into_string())
            .with_context(|| format!("Failed to write report: {}", path.as_ref().display()))
    }
}

/// Mean training curves of the four statistics for one dataset, y axis fixed to [0, 1].
pub fn plot_epoch_curves(summary: &StrategySummary) -> Plot {
    let mut plot = Plot::new();
    for stat in Stat::ALL {
        let values = &summary.mean_curves[&stat];
        let epochs: Vec<f64> = (1..=values.len()).map(|e| e as f64).collect();
        plot.add_trace(
            Scatter::new(epochs, values.clone())
                .name(stat.as_str())
                .mode(Mode::Lines),
        );
    }

    plot.set_layout(
        Layout::new()
            .title(summary.dataset.as_str())
            .x_axis(Axis::new().title("Epoch"))
            .y_axis(Axis::new().title("Mean metric value").range(vec![0.0, 1.0])),
    );
    plot
}

fn summary_table(results: &BenchmarkResults, stat: Stat) -> Markup {
    html! {
        h3 { "Held-out " (stat.as_str()) " (mean ± std over folds)" }
        table {
            thead {
                tr {
                    th { "dataset" }
                    @for strategy in &results.strategies {
                        th { (strategy) }
                    }
                }
            }
            tbody {
                @for dataset in &results.datasets {
                    tr {
                        td { (dataset.name) }
                        @for strategy in &results.strategies {
                            @match results.summary(&dataset.name, strategy) {
                                Some(summary) => {
                                    td { (format!("{:.3} ± {:.3}", summary.scores[&stat].mean, summary.scores[&stat].std)) }
                                }
                                None => { td { "-" } }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Assemble the HTML report: summary tables, one section of curves per strategy, datasets and configuration.
pub fn build_report(results: &BenchmarkResults, config: &BenchmarkConfig) -> Result<Report> {
    let mut report = Report::new("Imbalance Strategy Benchmark", env!("CARGO_PKG_VERSION"));

    let mut overview = ReportSection::new("Summary");
    overview.add_content(html! {
        p {
            "Neural network classifiers trained with " (results.strategies.len())
            " imbalance strategies on " (results.datasets.len()) " datasets, scored with "
            (config.cross_validation.n_repeats) " x " (config.cross_validation.n_splits)
            " repeated stratified cross-validation."
        }
    });
    for stat in Stat::ALL {
        overview.add_content(summary_table(results, stat));
    }
    report.add_section(overview);

    for strategy in &results.strategies {
        let mut section = ReportSection::new(strategy);
        section.add_content(html! {
            p { "Training statistics per epoch, averaged over folds." }
        });
        for summary in results.summaries.iter().filter(|s| &s.strategy == strategy) {
            section.add_plot(plot_epoch_curves(summary));
        }
        report.add_section(section);
    }

    let mut data_section = ReportSection::new("Datasets");
    data_section.add_content(html! {
        table {
            thead { tr { th { "dataset" } th { "samples" } th { "features" } th { "majority fraction" } } }
            tbody {
                @for d in &results.datasets {
                    tr {
                        td { (d.name) }
                        td { (d.n_samples) }
                        td { (d.n_features) }
                        td { (format!("{:.3}", d.majority_fraction)) }
                    }
                }
            }
        }
    });
    report.add_section(data_section);

    let mut config_section = ReportSection::new("Configuration");
    config_section.add_content(html! {
        div class="code-container" {
            pre { code { (serde_json::to_string_pretty(config)?) } }
        }
    });
    report.add_section(config_section);

    Ok(report)
}

#[derive(Serialize)]
struct ScoreRow<'a> {
    dataset: &'a str,
    strategy: &'a str,
    repeat: usize,
    split: usize,
    accuracy: f64,
    bal_accuracy: f64,
    precision: f64,
    recall: f64,
}

/// One row per (dataset, strategy, fold) with the four held-out scores.
pub fn write_scores_tsv<P: AsRef<Path>>(results: &BenchmarkResults, path: P) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(&path)
        .with_context(|| format!("Failed to create {}", path.as_ref().display()))?;

    for fold in &results.folds {
        writer.serialize(ScoreRow {
            dataset: &fold.dataset,
            strategy: &fold.strategy,
            repeat: fold.repeat,
            split: fold.split,
            accuracy: fold.scores[&Stat::Accuracy],
            bal_accuracy: fold.scores[&Stat::BalancedAccuracy],
            precision: fold.scores[&Stat::Precision],
            recall: fold.scores[&Stat::Recall],
        })?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_summary_json<P: AsRef<Path>>(results: &BenchmarkResults, path: P) -> Result<()> {
    let json = serde_json::to_string_pretty(results)?;
    fs::write(&path, json)
        .with_context(|| format!("Failed to write {}", path.as_ref().display()))
}

/// Write every output into `config.output_dir` and return the paths written.
pub fn write_outputs(results: &BenchmarkResults, config: &BenchmarkConfig) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(&config.output_dir).with_context(|| {
        format!("Failed to create output directory {}", config.output_dir.display())
    })?;

    let mut written = Vec::new();

    let scores = config.output_dir.join(SCORES_FILE);
    write_scores_tsv(results, &scores)?;
    written.push(scores);

    let summary = config.output_dir.join(SUMMARY_FILE);
    write_summary_json(results, &summary)?;
    written.push(summary);

    if config.report {
        let path = config.output_dir.join(REPORT_FILE);
        build_report(results, config)?.save_to_file(&path)?;
        written.push(path);
    }

    for path in &written {
        log::info!("Wrote {}", path.display());
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_section_renders_plots_and_content() {
        let mut section = ReportSection::new("Count Weighting");
        section.add_content(html! { p { "hello" } });
        section.add_plot(Plot::new());
        let html = section.render().into_string();
        assert!(html.contains("<h2>Count Weighting</h2>"));
        assert!(html.contains("hello"));
        assert!(html.contains("plot-count-weighting-1"));
    }

    #[test]
    fn test_plot_has_four_curves() {
        let mut mean_curves = BTreeMap::new();
        for stat in Stat::ALL {
            mean_curves.insert(stat, vec![0.1, 0.2, 0.3]);
        }
        let summary = StrategySummary {
            dataset: "glass1".to_string(),
            strategy: "smote".to_string(),
            n_folds: 2,
            scores: BTreeMap::new(),
            mean_curves,
            mean_loss: vec![],
        };
        let json = plot_epoch_curves(&summary).to_json();
        for stat in Stat::ALL {
            assert!(json.contains(stat.as_str()));
        }
        assert!(json.contains("glass1"));
    }
}
