//! Destination naming for generated components.

pub const TARGET_EXTENSION: &str = ".tsx";

/// Repository path for a generated component: the source name with its
/// final extension stripped and the target extension appended, joined under
/// `target_dir`. Names with multiple dots keep everything before the last
/// one (`a.b.png` becomes `a.b.tsx`).
pub fn destination_path(target_dir: &str, source_name: &str) -> String {
    let stem = match source_name.rfind('.') {
        Some(0) | None => source_name,
        Some(index) => &source_name[..index],
    };
    let file_name = format!("{stem}{TARGET_EXTENSION}");
    let dir = target_dir.trim_matches('/');
    if dir.is_empty() {
        file_name
    } else {
        format!("{dir}/{file_name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_the_final_extension_only() {
        assert_eq!(destination_path("", "diagram.png"), "diagram.tsx");
        assert_eq!(destination_path("", "a.b.png"), "a.b.tsx");
    }

    #[test]
    fn keeps_extensionless_names_whole() {
        assert_eq!(destination_path("", "notes"), "notes.tsx");
        assert_eq!(destination_path("", ".env"), ".env.tsx");
    }

    #[test]
    fn joins_under_the_target_directory() {
        assert_eq!(
            destination_path("src/components", "hero.jpg"),
            "src/components/hero.tsx"
        );
        assert_eq!(destination_path("pages/", "index.txt"), "pages/index.tsx");
        assert_eq!(destination_path("/", "solo.gif"), "solo.tsx");
    }
}
