use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use clap::Parser;
use std::path::PathBuf;
use time::format_description::well_known::Rfc3339;

use mitoscan::{
    HttpRelay, ImageSource, OverlayRenderer, UploadOrchestrator, UploadState, aggregate,
};

#[derive(Parser)]
#[command(name = "mitoscan")]
#[command(about = "Submit a histology image for mitosis detection and report the results")]
struct Cli {
    /// Path to input image file
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// Upload relay endpoint
    #[arg(long, default_value = "http://localhost:8000/predict")]
    relay: String,

    /// Write annotated images and heatmap patches to this directory
    #[arg(short, long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    // Load image bytes
    let bytes = std::fs::read(&args.image_path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", args.image_path.display(), e))?;
    let file_name = args
        .image_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow::anyhow!("Image path has no file name"))?;

    if args.verbose {
        println!("Submitting {} ({} bytes) to {}", file_name, bytes.len(), args.relay);
    }

    // Run one full upload cycle
    let mut orchestrator = UploadOrchestrator::new(HttpRelay::new(&args.relay));
    match orchestrator.submit(&file_name, &bytes).await {
        UploadState::Succeeded(done) => {
            let report = &done.report;

            // Print results
            println!("\n=== Analysis Summary ===");
            println!("Total candidates: {}", report.summary.total_candidates);
            println!("Confirmed mitotic: {}", report.summary.mitotic_count);
            println!("Non-mitotic: {}", report.summary.non_mitotic_count);
            println!("Average confidence: {:.1}%", report.average_confidence * 100.0);
            if let Some(secs) = report.processing_time {
                println!("Processing time: {:.2}s", secs);
            }

            if !report.class_distribution.is_empty() {
                println!("\nClass distribution:");
                for entry in &report.class_distribution {
                    println!("  {}: {}", entry.name, entry.count);
                }
            }
            println!("High confidence (>80%): {}", report.confidence_buckets.high);
            println!("Low confidence (<60%): {}", report.confidence_buckets.low);

            if done.result.detections.is_empty() {
                println!("\nNo candidate regions detected.");
            } else if args.verbose {
                println!("\nCandidate regions:");
                for det in &done.result.detections {
                    println!(
                        "  #{} {} at ({:.0}, {:.0})-({:.0}, {:.0}) - confidence: {:.1}%",
                        det.id,
                        det.label,
                        det.bbox.x1,
                        det.bbox.y1,
                        det.bbox.x2,
                        det.bbox.y2,
                        det.confidence * 100.0
                    );
                }
            }

            let confirmed = aggregate::confirmed_positives(&done.result.detections);
            if confirmed.is_empty() {
                println!("\nNo confirmed mitotic figures.");
            } else {
                println!("\nConfirmed mitotic figures ({}):", confirmed.len());
                for det in &confirmed {
                    println!(
                        "  #{} at ({:.0}, {:.0}) - confidence: {:.1}%",
                        det.id,
                        det.bbox.x1,
                        det.bbox.y1,
                        det.confidence * 100.0
                    );
                }
            }

            // Export artifacts if requested
            if let Some(dir) = &args.out {
                std::fs::create_dir_all(dir)?;

                // Fresh overlay from the original raster and the detections
                let renderer = OverlayRenderer::new();
                let mut source = ImageSource::from_base64(&done.result.original_image)?;
                let png = renderer.render_png(&mut source, &done.result.detections)?;
                std::fs::write(dir.join("annotated.png"), png)?;

                // Stage rasters exactly as the backend produced them
                std::fs::write(
                    dir.join("original.png"),
                    STANDARD.decode(&done.result.original_image)?,
                )?;
                std::fs::write(
                    dir.join("stage1_detection.png"),
                    STANDARD.decode(&done.result.stage1_annotated_image)?,
                )?;
                std::fs::write(
                    dir.join("stage2_classification.png"),
                    STANDARD.decode(&done.result.stage2_annotated_image)?,
                )?;

                // One saliency patch per confirmed positive
                for det in &confirmed {
                    if let Some(heatmap) = &det.heatmap_image {
                        std::fs::write(
                            dir.join(format!("heatmap_{:02}.png", det.id)),
                            STANDARD.decode(heatmap)?,
                        )?;
                    }
                }

                println!("\nArtifacts written to {}", dir.display());
            }
        }
        UploadState::Failed { message, detail } => match detail {
            Some(detail) => anyhow::bail!("{message}: {detail}"),
            None => anyhow::bail!("{message}"),
        },
        UploadState::Idle | UploadState::Submitting => {
            anyhow::bail!("upload ended in an unexpected state")
        }
    }

    // The completed upload is on record
    if let Some(entry) = orchestrator.history().entries().last() {
        println!(
            "\nRecorded {} at {}",
            entry.id,
            entry.timestamp.format(&Rfc3339)?
        );
    }

    Ok(())
}
