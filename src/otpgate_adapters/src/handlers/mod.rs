pub mod render_outcome;
