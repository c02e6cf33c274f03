//! Geographic event clustering tool
//!
//! Reads geographic points from a CSV file, clusters them with DBSCAN or
//! K-Means, and writes every input row back out with its cluster label
//! appended (-1 for noise).

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use csv::{ReaderBuilder, WriterBuilder};
use geo_cluster::cluster::{
    ClusterTag, Clusterer, Coordinate, CoordinateCollection, DEFAULT_MAX_ITERATIONS,
    DEFAULT_MIN_POINTS, Dbscan, KMeans, NeighbourSearch,
};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};


const NOISE_LABEL: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Algorithm {
    Dbscan,
    Kmeans,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Search {
    Brute,
    KdTree,
}

impl From<Search> for NeighbourSearch {
    fn from(s: Search) -> Self {
        match s {
            Search::Brute => NeighbourSearch::BruteForce,
            Search::KdTree => NeighbourSearch::KdTree,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "geo_cluster")]
#[command(about = "Geographic event clustering tool", long_about = None)]
struct Args {
    /// Input CSV file with latitude,longitude columns
    #[arg(short, long, env = "GEO_CLUSTER_INPUT", default_value = "points.csv")]
    input: PathBuf,

    /// Output CSV file with a cluster column appended (default: stdout)
    #[arg(short, long, env = "GEO_CLUSTER_OUTPUT")]
    output: Option<PathBuf>,

    /// Clustering algorithm
    #[arg(short, long, env = "GEO_CLUSTER_ALGORITHM", value_enum, default_value_t = Algorithm::Dbscan)]
    algorithm: Algorithm,

    /// DBSCAN epsilon (squared distance in raw degrees)
    #[arg(short, long, env = "GEO_CLUSTER_EPS", default_value_t = 0.01)]
    eps: f64,

    /// DBSCAN minPoints (neighbourhood size for a core point, itself included)
    #[arg(short = 'm', long, env = "GEO_CLUSTER_MIN_POINTS", default_value_t = DEFAULT_MIN_POINTS)]
    min_points: usize,

    /// DBSCAN neighbour search strategy
    #[arg(short, long, env = "GEO_CLUSTER_SEARCH", value_enum, default_value_t = Search::Brute)]
    search: Search,

    /// K-Means cluster count (0 estimates ceil(sqrt(n / 2)))
    #[arg(short, long, env = "GEO_CLUSTER_K", default_value_t = 0)]
    k: usize,

    /// K-Means pass limit
    #[arg(long, env = "GEO_CLUSTER_MAX_ITERATIONS", default_value_t = DEFAULT_MAX_ITERATIONS)]
    max_iterations: usize,

    /// Enable debug output
    #[arg(short, long, env = "GEO_CLUSTER_DEBUG")]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.debug);

    let input = read_points_and_csv(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let mut coordinates = input.coordinates;

    if coordinates.is_empty() {
        bail!("no points found in {}", args.input.display());
    }
    info!(points = coordinates.len(), input = %args.input.display(), "read points");

    let mut clusterer = build_clusterer(&args);
    clusterer
        .analyse(&mut coordinates)
        .context("clustering failed")?;

    summarize(clusterer.clusters());
    let labels = build_labels(&coordinates);

    match &args.output {
        None => write_labelled(
            io::stdout().lock(),
            input.header.as_deref(),
            &input.records,
            &labels,
        )
        .context("writing to stdout")?,
        Some(output_file) => {
            let out = File::create(output_file)
                .with_context(|| format!("creating {}", output_file.display()))?;
            write_labelled(out, input.header.as_deref(), &input.records, &labels)
                .with_context(|| format!("writing {}", output_file.display()))?;
            info!(output = %output_file.display(), "labelled points written");
        }
    }

    Ok(())
}

/// Installs the stderr log subscriber. `RUST_LOG` overrides the default level.
fn init_tracing(debug: bool) {
    let default = if debug { "geo_cluster=debug" } else { "geo_cluster=info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn build_clusterer(args: &Args) -> Box<dyn Clusterer> {
    match args.algorithm {
        Algorithm::Dbscan => {
            debug!(
                eps = args.eps,
                min_points = args.min_points,
                search = ?args.search,
                "using dbscan"
            );
            Box::new(Dbscan::new(args.eps, args.min_points).with_search(args.search.into()))
        }
        Algorithm::Kmeans => {
            debug!(k = args.k, max_iterations = args.max_iterations, "using k-means");
            Box::new(KMeans::new(args.k).with_max_iterations(args.max_iterations))
        }
    }
}

/// CSV records type alias for readability
type CsvRecords = Vec<Vec<String>>;

/// Parsed input: one record per coordinate, in the same order
struct Input {
    coordinates: CoordinateCollection,
    records: CsvRecords,
    header: Option<Vec<String>>,
}

/// Reads points and CSV records from a file in a single pass
///
/// Expected format: `latitude,longitude[,...]` (header row is optional).
/// Rows whose first two fields are not finite numbers are skipped.
fn read_points_and_csv(filename: &Path) -> Result<Input> {
    let file = File::open(filename)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut coordinates = Vec::new();
    let mut records = Vec::new();
    let mut header = None;

    for (row, result) in reader.records().enumerate() {
        let record: Vec<String> = result?.iter().map(|s| s.to_string()).collect();

        let lat = record.first().map(|s| s.trim().parse::<f64>());
        let lon = record.get(1).map(|s| s.trim().parse::<f64>());
        match (lat, lon) {
            (Some(Ok(lat)), Some(Ok(lon))) if lat.is_finite() && lon.is_finite() => {
                coordinates.push(Coordinate::new(lon, lat));
                records.push(record);
            }
            (Some(Ok(_)), Some(Ok(_))) => warn!(row, "skipping row with non-finite coordinate"),
            _ if row == 0 => header = Some(record),
            _ => warn!(row, "skipping row without latitude,longitude"),
        }
    }

    Ok(Input {
        coordinates: coordinates.into(),
        records,
        header,
    })
}

/// Creates a labels array from the coordinate tags
///
/// `labels[i]` = cluster index for point i, or -1 for noise
fn build_labels(coordinates: &CoordinateCollection) -> Vec<i64> {
    coordinates
        .iter()
        .map(|c| match c.tag() {
            ClusterTag::Cluster(id) => id as i64,
            ClusterTag::Noise | ClusterTag::Unassigned => NOISE_LABEL,
        })
        .collect()
}

/// Logs size, center and covering radius of every cluster
fn summarize(clusters: &[CoordinateCollection]) {
    info!(clusters = clusters.len(), "clustering finished");
    for (id, cluster) in clusters.iter().enumerate() {
        match cluster.covering_centroid() {
            Ok(c) => info!(
                cluster = id,
                size = cluster.len(),
                longitude = c.center.longitude,
                latitude = c.center.latitude,
                radius_km = c.radius,
                "cluster"
            ),
            Err(_) => debug!(cluster = id, "empty cluster"),
        }
    }
}

/// Writes every record with its label appended as a `cluster` column
fn write_labelled<W: io::Write>(
    out: W,
    header: Option<&[String]>,
    records: &[Vec<String>],
    labels: &[i64],
) -> Result<()> {
    let mut writer = WriterBuilder::new().flexible(true).from_writer(out);

    if let Some(header) = header {
        let mut row = header.to_vec();
        row.push("cluster".to_string());
        writer.write_record(&row)?;
    }

    for (record, label) in records.iter().zip(labels) {
        let mut row = record.clone();
        row.push(label.to_string());
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}
