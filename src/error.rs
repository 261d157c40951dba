// src/error.rs

use thiserror::Error;

/// Pipeline failure, tagged by the stage that produced it. The dashboard layer
/// turns the tag into the user-visible error line; neither variant ever aborts
/// the process.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("Error al descargar el archivo: {0}")]
    Download(String),
    #[error("Error al leer el archivo Excel: {0}")]
    Parse(String),
}
