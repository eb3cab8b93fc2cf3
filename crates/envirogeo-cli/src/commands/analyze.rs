//! Analysis command implementation

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::info;

use envirogeo_core::{
    export,
    models::{AnalysisResult, ParameterId},
    store::{to_document, ANALYSIS_HISTORY},
    AnalysisRequest, Analyzer, AppConfig, AreaSelection, CoordinateInput, DocumentStore,
    ExportFormat, StoreClient,
};

use super::{build_analyzer, open_store};
use crate::cli::AnalyzeArgs;

pub async fn cmd_analyze(config: &AppConfig, args: &AnalyzeArgs) -> Result<()> {
    let analyzer = build_analyzer(config)?;
    let result = run_analysis(&analyzer, args).await?;
    print_result(&result);

    if let Some(format) = args.export.as_deref() {
        let format: ExportFormat = format.parse()?;
        let path = write_export(&result, format, &args.out)?;
        println!("   📄 Exported to {}", path.display());
    }

    if let Some(user) = args.save_as.as_deref() {
        let store = open_store(config)?;
        let id = save_to_history(&store, user, &result)?;
        println!("   💾 Saved to history of {} (id {})", user, id);
    }

    Ok(())
}

/// Build the area selection from `--lat/--lon` or `--bbox`
///
/// Missing coordinates are passed through empty so the analyzer reports them.
pub fn parse_area(lat: Option<f64>, lon: Option<f64>, bbox: Option<&str>) -> Result<AreaSelection> {
    if let Some(bbox) = bbox {
        return parse_bbox(bbox);
    }

    let coordinate = |v: Option<f64>| v.map(CoordinateInput::from).unwrap_or_else(|| "".into());
    Ok(AreaSelection::Coordinates {
        lat: coordinate(lat),
        lon: coordinate(lon),
    })
}

/// Parse `NORTH,SOUTH,EAST,WEST`
pub fn parse_bbox(value: &str) -> Result<AreaSelection> {
    let parts: Vec<f64> = value
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .with_context(|| format!("Invalid bounding box value '{}'", part.trim()))
        })
        .collect::<Result<_>>()?;

    let &[north, south, east, west] = parts.as_slice() else {
        bail!("Bounding box needs four values: NORTH,SOUTH,EAST,WEST");
    };

    Ok(AreaSelection::BoundingBox {
        north: north.into(),
        south: south.into(),
        east: east.into(),
        west: west.into(),
    })
}

/// Validate the arguments and run the analysis
pub async fn run_analysis(analyzer: &Analyzer, args: &AnalyzeArgs) -> Result<AnalysisResult> {
    let parameter: ParameterId = args.parameter.parse()?;
    let request = AnalysisRequest {
        parameter,
        area: parse_area(args.lat, args.lon, args.bbox.as_deref())?,
        start_date: args.from,
        end_date: args.to,
    };

    Ok(analyzer.analyze(&request).await?)
}

/// Write `result` into `dir`, returning the file path
pub fn write_export(result: &AnalysisResult, format: ExportFormat, dir: &Path) -> Result<PathBuf> {
    let file = export::export(result, format)?;

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    let path = dir.join(&file.file_name);
    fs::write(&path, &file.content)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!(path = %path.display(), format = %format, "Wrote export");
    Ok(path)
}

/// Save `result` to `user`'s analysis history, returning the new id
pub fn save_to_history(store: &StoreClient, user: &str, result: &AnalysisResult) -> Result<String> {
    let data = to_document(&result.to_new_analysis())?;
    Ok(store.save_analysis(ANALYSIS_HISTORY, user, data)?)
}

fn print_result(result: &AnalysisResult) {
    let stats = &result.stats;

    println!();
    println!(
        "📊 {} ({}) {} to {}",
        result.parameter.name, result.parameter.unit, result.start_date, result.end_date
    );
    println!("   ─────────────────────────────");
    if let Some(source) = result.source.as_deref() {
        println!("   Source: {}", source);
    }
    println!("   Samples: {}", result.time_series.len());
    println!("   Mean:    {}", stats.mean);
    println!("   Range:   {} to {}", stats.min, stats.max);
    println!("   Std dev: {}", stats.std_dev);
    println!("   Trend:   {} ({}%)", stats.trend, stats.trend_percent);

    println!();
    for insight in &result.insights {
        println!("   • {}", insight);
    }
}
