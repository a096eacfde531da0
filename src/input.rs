use std::io::Read as _;

use anyhow::Context as _;

/// Reads a document from a path, or from stdin when the path is `-`.
pub fn read_input(path: &str) -> anyhow::Result<Vec<u8>> {
    if path == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("read document from stdin")?;
        return Ok(buf);
    }

    std::fs::read(path).with_context(|| format!("read document: {path}"))
}
