use blobtrack_core::detection::TrackSummary;
use blobtrack_core::pipeline::{TrackConfig, TrackMetadata};
use console::Style;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    dim: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            dim: Style::new().dim().yellow(),
        }
    }
}

pub fn print_track_summary(
    config: &TrackConfig,
    dim: (usize, usize, usize),
    metadata: &TrackMetadata,
    tracks: &[TrackSummary],
) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Blob Tracking"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(13)));
    println!();

    let (frames, nlat, nlon) = dim;
    println!(
        "  {:<18}{}",
        s.label.apply_to("Grid"),
        s.value.apply_to(format!("{frames} x {nlat} x {nlon}"))
    );
    println!(
        "  {:<18}{}",
        s.label.apply_to("Radius"),
        s.value.apply_to(config.radius)
    );
    println!(
        "  {:<18}{}",
        s.label.apply_to("Area quantile"),
        s.value.apply_to(config.area_quantile)
    );
    println!();

    println!("  {}", s.header.apply_to("Area Filter"));
    println!(
        "    {:<16}{}",
        s.label.apply_to("Min area"),
        s.value.apply_to(format!("{:.0} km\u{b2}", metadata.min_area))
    );
    println!(
        "    {:<16}{}",
        s.label.apply_to("Area kept"),
        s.value
            .apply_to(format!("{:.1}%", metadata.percent_area_kept * 100.0))
    );
    println!(
        "    {:<16}{}",
        s.label.apply_to("Features"),
        s.value.apply_to(metadata.initial_features)
    );
    println!();

    println!(
        "  {} {}",
        s.header.apply_to("Tracks"),
        s.dim.apply_to(format!("({})", metadata.final_features))
    );
    if tracks.is_empty() {
        println!("    {}", s.dim.apply_to("none"));
    }
    for track in tracks {
        println!(
            "    {:>4}  {}  {}  {}",
            s.value.apply_to(track.id),
            s.label.apply_to(format!(
                "frames {:>3}-{:<3}",
                track.first_frame, track.last_frame
            )),
            s.label
                .apply_to(format!("present {:>3}", track.frames_present)),
            s.value.apply_to(format!(
                "peak {:>10.0} km\u{b2}",
                track.peak_area_km2
            )),
        );
    }
    println!();
}
