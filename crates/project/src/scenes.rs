//! Ordered scene list operations. Every operation leaves the scene numbers
//! at exactly `1..=N` in list order.

use crate::model::Scene;

pub fn renumber(scenes: &mut [Scene]) {
    for (index, scene) in scenes.iter_mut().enumerate() {
        scene.number = index as u32 + 1;
    }
}

/// Appends a default scene and returns it.
pub fn add_scene(scenes: &mut Vec<Scene>) -> &mut Scene {
    let number = scenes.len() as u32 + 1;
    scenes.push(Scene::new(number));
    let last = scenes.len() - 1;
    &mut scenes[last]
}

pub fn delete_scene(scenes: &mut Vec<Scene>, scene_id: &str) -> Option<Scene> {
    let index = scenes.iter().position(|s| s.id == scene_id)?;
    let removed = scenes.remove(index);
    renumber(scenes);
    Some(removed)
}

pub fn append_scenes(scenes: &mut Vec<Scene>, new_scenes: impl IntoIterator<Item = Scene>) {
    scenes.extend(new_scenes);
    renumber(scenes);
}

/// Swaps in `scene` for the entry with the same id, keeping its position.
/// Returns `false` when no scene has that id.
pub fn replace_scene(scenes: &mut [Scene], scene: Scene) -> bool {
    match scenes.iter().position(|s| s.id == scene.id) {
        Some(index) => {
            let number = scenes[index].number;
            scenes[index] = Scene { number, ..scene };
            true
        }
        None => false,
    }
}

pub fn move_scene(scenes: &mut Vec<Scene>, scene_id: &str, to: usize) -> bool {
    let Some(from) = scenes.iter().position(|s| s.id == scene_id) else {
        return false;
    };
    let scene = scenes.remove(from);
    let to = to.min(scenes.len());
    scenes.insert(to, scene);
    renumber(scenes);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(scenes: &[Scene]) -> Vec<u32> {
        scenes.iter().map(|s| s.number).collect()
    }

    #[test]
    fn add_uses_defaults_and_next_number() {
        let mut scenes = Vec::new();
        add_scene(&mut scenes);
        let scene = add_scene(&mut scenes);
        assert_eq!(scene.number, 2);
        assert_eq!(scene.duration, 5.0);
        assert!(scene.characters.is_empty());
    }

    #[test]
    fn insert_delete_sequences_keep_contiguous_numbers() {
        let mut scenes = Vec::new();
        for _ in 0..5 {
            add_scene(&mut scenes);
        }
        let second = scenes[1].id.clone();
        let fourth = scenes[3].id.clone();
        delete_scene(&mut scenes, &second);
        assert_eq!(numbers(&scenes), vec![1, 2, 3, 4]);
        add_scene(&mut scenes);
        delete_scene(&mut scenes, &fourth);
        assert_eq!(numbers(&scenes), vec![1, 2, 3, 4]);
        let first = scenes[0].id.clone();
        delete_scene(&mut scenes, &first);
        assert_eq!(numbers(&scenes), vec![1, 2, 3]);
        assert!(delete_scene(&mut scenes, "missing").is_none());
    }

    #[test]
    fn append_renumbers_incoming_scenes() {
        let mut scenes = vec![Scene::new(1)];
        append_scenes(&mut scenes, vec![Scene::new(1), Scene::new(1)]);
        assert_eq!(numbers(&scenes), vec![1, 2, 3]);
    }

    #[test]
    fn replace_keeps_position_and_number() {
        let mut scenes = vec![Scene::new(1), Scene::new(2)];
        let mut edited = scenes[1].clone();
        edited.script = "Rain falls.".into();
        edited.number = 99;
        assert!(replace_scene(&mut scenes, edited));
        assert_eq!(scenes[1].script, "Rain falls.");
        assert_eq!(scenes[1].number, 2);
        assert!(!replace_scene(&mut scenes, Scene::new(3)));
    }

    #[test]
    fn move_reorders_and_renumbers() {
        let mut scenes = vec![Scene::new(1), Scene::new(2), Scene::new(3)];
        let last = scenes[2].id.clone();
        assert!(move_scene(&mut scenes, &last, 0));
        assert_eq!(scenes[0].id, last);
        assert_eq!(numbers(&scenes), vec![1, 2, 3]);
    }
}
