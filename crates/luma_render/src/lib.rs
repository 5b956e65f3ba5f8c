//! Rendering algorithms and the machinery that drives them: the integrator
//! family, the tile scheduler with its worker pool, the film, and live
//! preview streaming to the tev image viewer.

pub mod film;
pub mod integrator;
pub mod preview;
pub mod renderer;
pub mod tile;

pub use film::{Film, FilmError};
pub use integrator::{
    AlbedoIntegrator, BvhPerformance, DirectIntegrator, Integrator, NormalsIntegrator, PathTracer,
};
pub use preview::Preview;
pub use renderer::{render, render_simple, RenderSettings};
pub use tile::{generate_tiles, Tile};
