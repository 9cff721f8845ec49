use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Buffered report sink; flushed by the report writer, closed on drop.
pub type Destination = BufWriter<Box<dyn Write>>;

/// Open `path` (created or truncated) or fall back to stdout.
pub fn open(path: Option<&Path>) -> io::Result<Destination> {
    let sink: Box<dyn Write> = match path {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                io::Error::new(e.kind(), format!("cannot open {}: {e}", path.display()))
            })?;
            tracing::debug!(path = %path.display(), "writing report to file");
            Box::new(file)
        }
        None => Box::new(io::stdout().lock()),
    };
    Ok(BufWriter::new(sink))
}
