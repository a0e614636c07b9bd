use names::Generator;
use tracing::debug;

const MAX_REDRAWS: usize = 8;

/// Resolved names for the snapshot image and the replacement container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Names {
    pub image: String,
    pub container: String,
}

/// Fill in missing names with readable random ones (`adjective-noun`).
///
/// The two placeholders are drawn independently. A generated container name
/// equal to the image name is redrawn.
pub fn resolve_names(image: Option<String>, container: Option<String>) -> Names {
    let mut generator = Generator::default();
    resolve_with(image, container, || generator.next())
}

fn resolve_with<F>(image: Option<String>, container: Option<String>, mut draw: F) -> Names
where
    F: FnMut() -> Option<String>,
{
    let image = image
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| draw_name(&mut draw, "snapshot"));

    let container = match container.filter(|name| !name.is_empty()) {
        Some(name) => name,
        None => {
            let mut name = draw_name(&mut draw, "container");
            let mut redraws = 0;
            while name == image && redraws < MAX_REDRAWS {
                debug!(name = %name, "Generated container name matches image name, redrawing");
                name = draw_name(&mut draw, "container");
                redraws += 1;
            }
            if name == image {
                name.push_str("-ctr");
            }
            name
        }
    };

    Names { image, container }
}

fn draw_name<F>(draw: &mut F, fallback: &str) -> String
where
    F: FnMut() -> Option<String>,
{
    draw().unwrap_or_else(|| format!("swim-{fallback}-{}", std::process::id()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_supplied_names() {
        let names = resolve_names(Some("snap:v1".into()), Some("web-2".into()));
        assert_eq!(
            names,
            Names {
                image: "snap:v1".into(),
                container: "web-2".into()
            }
        );
    }

    #[test]
    fn test_generates_missing_names() {
        let names = resolve_names(None, None);
        assert!(!names.image.is_empty());
        assert!(!names.container.is_empty());
        assert_ne!(names.image, names.container);
        assert!(names.image.contains('-'));
    }

    #[test]
    fn test_empty_names_are_treated_as_missing() {
        let names = resolve_names(Some(String::new()), Some("web".into()));
        assert!(!names.image.is_empty());
    }

    #[test]
    fn test_redraws_colliding_container_name() {
        let mut draws = vec!["brave-otter", "brave-otter", "calm-heron"].into_iter();
        let names = resolve_with(None, None, || draws.next().map(String::from));
        assert_eq!(names.image, "brave-otter");
        assert_eq!(names.container, "calm-heron");
    }

    #[test]
    fn test_persistent_collision_is_disambiguated() {
        let names = resolve_with(None, None, || Some("same-name".to_string()));
        assert_eq!(names.container, "same-name-ctr");
    }

    #[test]
    fn test_supplied_container_may_equal_image() {
        let names = resolve_with(Some("app".into()), Some("app".into()), || None);
        assert_eq!(names.container, "app");
    }
}
