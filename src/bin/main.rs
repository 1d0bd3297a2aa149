//! qjulia CLI
//!
//! Command-line front end for the quaternion Julia iso-surface engine.

use clap::{Parser, Subcommand};
use glam::{UVec3, Vec3};
use qjulia::engine::{SurfaceEngine, SurfaceRequest};
use qjulia::io::load_request;
use qjulia::types::{GridBounds, Quaternion};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "qjulia")]
#[command(version = qjulia::VERSION)]
#[command(about = "Quaternion Julia set iso-surface engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sample a recurrence, extract the iso-surface, report the normal
    Render {
        /// Load the full request from a JSON file (other flags ignored)
        #[arg(long, value_name = "FILE")]
        request: Option<PathBuf>,

        /// Recurrence formula
        #[arg(short, long, default_value = "Z' = Z*Z + C")]
        equation: String,

        /// Constant parameter as w,x,y,z
        #[arg(short, long, value_name = "W,X,Y,Z", default_value = "0,0,0,0")]
        constant: String,

        /// Fourth component of the starting quaternions
        #[arg(long, default_value_t = 0.0)]
        z_w: f32,

        /// Iteration budget per grid point
        #[arg(short = 'i', long, default_value_t = 20)]
        max_iterations: u16,

        /// Escape radius / iso level
        #[arg(short, long, default_value_t = 2.0)]
        threshold: f32,

        /// Half-extent of the cubic bounding box
        #[arg(long, default_value_t = 1.5)]
        half_extent: f32,

        /// Lattice points per axis
        #[arg(short, long, default_value_t = 64)]
        resolution: u32,

        /// Close the surface at the domain boundary
        #[arg(long)]
        border: bool,

        /// Write the triangles to this binary STL file
        #[arg(long, value_name = "FILE")]
        stl: Option<PathBuf>,
    },

    /// Compile a formula without evaluating anything
    Check {
        /// Recurrence formula
        equation: String,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            request,
            equation,
            constant,
            z_w,
            max_iterations,
            threshold,
            half_extent,
            resolution,
            border,
            stl,
        } => {
            let request = match request {
                Some(path) => match load_request(&path) {
                    Ok(r) => r,
                    Err(err) => {
                        eprintln!("error: failed to load {}: {err}", path.display());
                        return ExitCode::FAILURE;
                    }
                },
                None => {
                    let constant = match parse_quaternion(&constant) {
                        Ok(q) => q,
                        Err(err) => {
                            eprintln!("error: --constant: {err}");
                            return ExitCode::FAILURE;
                        }
                    };
                    SurfaceRequest {
                        equation,
                        z_w,
                        constant,
                        max_iterations,
                        threshold,
                        bounds: GridBounds::symmetric(half_extent),
                        resolution: UVec3::splat(resolution),
                        make_border: border,
                        write_triangles: stl,
                    }
                }
            };

            let engine = match SurfaceEngine::new(&request) {
                Ok(engine) => engine,
                Err(err) => {
                    eprintln!("error: {err}");
                    return ExitCode::FAILURE;
                }
            };

            let report = engine.run();
            println!("Triangles: {}", report.mesh.triangle_count());
            if report.surface_found() {
                let Vec3 { x, y, z } = report.normal;
                println!("Normal:    {x:.6} {y:.6} {z:.6}");
            } else {
                println!("Normal:    none (no surface crossed the threshold)");
            }
            if let Some(err) = &report.emit_error {
                eprintln!("warning: mesh emission failed: {err}");
            }
            ExitCode::SUCCESS
        }

        Commands::Check { equation } => match qjulia::compile(&equation) {
            Ok(rec) => {
                println!("OK: {} expression nodes", rec.root().node_count());
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("error: {err}");
                ExitCode::FAILURE
            }
        },
    }
}

/// Parse `w,x,y,z` into a quaternion
fn parse_quaternion(text: &str) -> Result<Quaternion, String> {
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    if parts.len() != 4 {
        return Err(format!("expected 4 comma-separated components, got {}", parts.len()));
    }
    let mut components = [0.0f32; 4];
    for (slot, part) in components.iter_mut().zip(&parts) {
        *slot = part
            .parse::<f32>()
            .map_err(|_| format!("`{part}` is not a number"))?;
    }
    let [w, x, y, z] = components;
    Ok(Quaternion::new(w, x, y, z))
}
