use std::fs;

use verchain::{encode_frame, split_frame, Error, FRAME_HEADER_SIZE};

type Result = std::result::Result<(), Box<dyn std::error::Error>>;

/// `verchain inspect <file>`: Show the frame version and payload size.
pub fn inspect(path: &str, hex_limit: Option<usize>) -> Result {
    let data = read(path)?;
    let (version, payload) = split_frame(&data)?;

    println!("File: {path}");
    println!("Size: {}", format_bytes(data.len()));
    println!("Version: v{version}");
    println!("Payload: {} bytes", payload.len());

    if let Some(limit) = hex_limit {
        println!();
        print!("{}", hex_dump(payload, limit));
        if payload.len() > limit {
            println!("  ... {} more bytes", payload.len() - limit);
        }
    }

    Ok(())
}

/// `verchain wrap <in> <out> --version N`: Frame a raw payload.
pub fn wrap(input: &str, output: &str, version: u16) -> Result {
    if version == 0 {
        return Err(Error::InvalidVersion(version).into());
    }

    let payload = read(input)?;
    let framed = encode_frame(version, &payload);
    write(output, &framed)?;

    tracing::info!(input, output, version, "wrapped payload");
    println!("Wrote {output} (v{version}, {})", format_bytes(framed.len()));
    Ok(())
}

/// `verchain unwrap <in> <out>`: Strip the frame header.
pub fn unwrap(input: &str, output: &str) -> Result {
    let data = read(input)?;
    let (version, payload) = split_frame(&data)?;
    write(output, payload)?;

    tracing::info!(input, output, version, "unwrapped payload");
    println!("Wrote {output} (v{version}, {})", format_bytes(payload.len()));
    Ok(())
}

// ── Helpers ──────────────────────────────────────────────────────────

fn read(path: &str) -> std::result::Result<Vec<u8>, Box<dyn std::error::Error>> {
    fs::read(path).map_err(|e| format!("cannot read {path}: {e}").into())
}

fn write(path: &str, data: &[u8]) -> Result {
    fs::write(path, data).map_err(|e| format!("cannot write {path}: {e}").into())
}

fn format_bytes(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

/// Sixteen bytes per row, offsets relative to the payload start.
fn hex_dump(data: &[u8], limit: usize) -> String {
    let mut out = String::new();
    for (row, chunk) in data[..data.len().min(limit)].chunks(16).enumerate() {
        let bytes: Vec<String> = chunk.iter().map(|b| format!("{b:02x}")).collect();
        out.push_str(&format!(
            "  {:08x}  {}\n",
            row * 16 + FRAME_HEADER_SIZE,
            bytes.join(" ")
        ));
    }
    out
}
