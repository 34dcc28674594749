use console::Style;
use caltrace_core::peaks::PeakDistributions;
use caltrace_core::pipeline::config::PipelineConfig;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_pipeline_summary(config: &PipelineConfig) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Caltrace Pipeline"));
    println!("  {}", s.title.apply_to("\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}"));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Input"),
        s.path.apply_to(config.input.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Mask"),
        s.path.apply_to(config.mask_path().display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(config.output.display())
    );
    println!();

    println!("  {}", s.header.apply_to("Normalization"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Quantity"),
        s.method.apply_to(config.normalize.quantity)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Window"),
        s.value.apply_to(config.normalize.window_size)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("K percent"),
        s.value.apply_to(config.normalize.k_percent)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Smoothing"),
        s.value.apply_to(config.normalize.smoothing)
    );
    if config.normalize.subtract_background {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Background"),
            s.method.apply_to("subtracted")
        );
    } else {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Background"),
            s.disabled.apply_to("kept")
        );
    }
    println!();

    println!("  {}", s.header.apply_to("Peak Detection"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Min height"),
        s.value.apply_to(config.peaks.min_height)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Prominence"),
        s.value.apply_to(config.peaks.min_prominence)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Rel height"),
        s.value.apply_to(config.peaks.rel_height)
    );
    println!();

    if let Some(ref heatmap) = config.heatmap {
        println!(
            "  {:<14}{}",
            s.header.apply_to("Heatmap"),
            s.path.apply_to(heatmap.display())
        );
    } else {
        println!(
            "  {:<14}{}",
            s.header.apply_to("Heatmap"),
            s.disabled.apply_to("disabled")
        );
    }
    println!();
}

pub fn print_distribution_summary(dist: &PeakDistributions, peak_count: usize) {
    let s = Styles::new();

    println!();
    println!("  {}", s.header.apply_to("Peaks"));
    println!(
        "    {:<14}{}",
        s.label.apply_to("Total"),
        s.value.apply_to(peak_count)
    );
    println!(
        "    {:<14}{}",
        s.label.apply_to("Active cells"),
        s.value.apply_to(format!(
            "{}/{}",
            dist.counts.iter().filter(|&&c| c > 0).count(),
            dist.counts.len()
        ))
    );
    if let Some(h) = mean(&dist.heights) {
        println!(
            "    {:<14}{}",
            s.label.apply_to("Mean height"),
            s.value.apply_to(format!("{h:.3}"))
        );
    }
    if let Some(w) = mean(&dist.widths) {
        println!(
            "    {:<14}{}",
            s.label.apply_to("Mean width"),
            s.value.apply_to(format!("{w:.2} frames"))
        );
    }
    if let Some(f) = mean(&dist.frequencies) {
        println!(
            "    {:<14}{}",
            s.label.apply_to("Frequency"),
            s.value.apply_to(format!("{f:.4} peaks/frame"))
        );
    }
    println!();
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
