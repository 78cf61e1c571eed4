//! Part-name arithmetic for OPC packages.
//!
//! Part names are `/`-separated and case-sensitive. Relationship targets are
//! resolved against the directory of the part that declares them, the same
//! way consumers resolve `../media/image1.png` from `ppt/slides/slide1.xml`.

/// Path of the relationships sidecar for a part.
///
/// `xl/workbook.xml` maps to `xl/_rels/workbook.xml.rels`; a root-level part
/// maps into the top-level `_rels/` directory.
pub fn rels_part_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
        None => format!("_rels/{part}.rels"),
    }
}

/// Resolve a relationship target against the part that declares it.
///
/// Absolute targets (leading `/`) resolve from the package root. Relative
/// targets resolve from the source part's directory. `.` and `..` segments
/// are collapsed; `..` never climbs above the package root.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    // Targets may carry a URI fragment; part names never do.
    let target = match target.split_once('#') {
        Some((base, _)) => base,
        None => target,
    };
    if target.is_empty() {
        return normalize(source_part);
    }
    match target.strip_prefix('/') {
        Some(absolute) => normalize(absolute),
        None => {
            let dir = source_part.rsplit_once('/').map_or("", |(dir, _)| dir);
            if dir.is_empty() {
                normalize(target)
            } else {
                normalize(&format!("{dir}/{target}"))
            }
        }
    }
}

fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }
    segments.join("/")
}
