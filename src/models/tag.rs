use serde::{Deserialize, Serialize};

/// A thread tag. The set of valid tags is a fixed catalog; submitted tags
/// are canonicalized against it by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub color: String,
}

const CATALOG: &[(i64, &str, &str)] = &[
    (1, "Announcement", "bg-red-100 text-red-800"),
    (2, "Major Update", "bg-purple-100 text-purple-800"),
    (3, "Minor Update", "bg-blue-100 text-blue-800"),
    (4, "Discussion", "bg-pink-100 text-pink-800"),
    (5, "Question", "bg-yellow-100 text-yellow-800"),
    (6, "Bug Report", "bg-orange-100 text-orange-800"),
];

/// All available tags.
pub fn catalog() -> Vec<Tag> {
    CATALOG
        .iter()
        .map(|&(id, name, color)| Tag {
            id,
            name: name.to_string(),
            color: color.to_string(),
        })
        .collect()
}

/// Look up a catalog tag by id.
pub fn by_id(id: i64) -> Option<Tag> {
    CATALOG
        .iter()
        .find(|&&(tid, _, _)| tid == id)
        .map(|&(id, name, color)| Tag {
            id,
            name: name.to_string(),
            color: color.to_string(),
        })
}

/// Canonicalize a list of submitted tags against the catalog.
/// Unknown ids are an error; name/color are taken from the catalog,
/// not from the submission. Duplicates collapse to one entry.
pub fn canonicalize(tags: &[Tag]) -> Result<Vec<Tag>, i64> {
    let mut out: Vec<Tag> = Vec::with_capacity(tags.len());
    for tag in tags {
        match by_id(tag.id) {
            Some(canonical) => {
                if !out.iter().any(|t| t.id == canonical.id) {
                    out.push(canonical);
                }
            }
            None => return Err(tag.id),
        }
    }
    Ok(out)
}
