use project::{AiAssetMetadata, Asset, AssetType};
use search::{filter_library, rank, SearchCriteria, MAX_RESULTS};

fn named(name: &str, asset_type: AssetType) -> Asset {
    Asset::new(name, asset_type, "https://example.com/a.png")
}

#[test]
fn ranking_orders_by_descending_score() {
    let mut high = named("Knight Hero", AssetType::Character);
    high.ai_metadata = Some(AiAssetMetadata {
        search_keywords: vec!["knight".into()],
        mood: "Brave".into(),
        ..AiAssetMetadata::default()
    });
    let mid = named("Knight", AssetType::Character);
    let mut low = named("Banner", AssetType::Prop).with_tags(["knight order"]);
    low.ai_metadata = Some(AiAssetMetadata::default());

    let assets = vec![mid, high, low];
    let criteria = SearchCriteria {
        asset_types: vec!["character".into()],
        descriptors: vec!["knight".into()],
        mood: "brave".into(),
        ..SearchCriteria::default()
    };
    let results = rank(&assets, &criteria);
    let scores: Vec<u32> = results.iter().map(|r| r.score).collect();
    assert_eq!(scores, vec![80, 50, 10]);
    assert_eq!(results[0].asset.name, "Knight Hero");
}

#[test]
fn ties_keep_library_order() {
    let assets = vec![
        named("Robot A", AssetType::Character),
        named("Robot B", AssetType::Character),
    ];
    let criteria = SearchCriteria {
        descriptors: vec!["robot".into()],
        ..SearchCriteria::default()
    };
    let names: Vec<&str> = rank(&assets, &criteria)
        .iter()
        .map(|r| r.asset.name.as_str())
        .collect();
    assert_eq!(names, vec!["Robot A", "Robot B"]);
}

#[test]
fn never_more_than_twenty_results() {
    let assets: Vec<Asset> = (0..35)
        .map(|i| named(&format!("Tree {i}"), AssetType::Prop))
        .collect();
    let criteria = SearchCriteria {
        descriptors: vec!["tree".into()],
        ..SearchCriteria::default()
    };
    assert_eq!(rank(&assets, &criteria).len(), MAX_RESULTS);
}

#[test]
fn library_filter_combines_term_type_and_style() {
    let mut anime = named("Hero", AssetType::Character);
    anime.ai_metadata = Some(AiAssetMetadata {
        art_style: "Anime cel shading".into(),
        detected_objects: vec!["sword".into()],
        ..AiAssetMetadata::default()
    });
    let plain = named("Sword rack", AssetType::Prop);
    let assets = vec![anime, plain];

    assert_eq!(filter_library(&assets, "", None, None).len(), 2);
    assert_eq!(filter_library(&assets, "SWORD", None, Some("any")).len(), 2);
    let styled = filter_library(&assets, "sword", None, Some("anime"));
    assert_eq!(styled.len(), 1);
    assert_eq!(styled[0].name, "Hero");
    assert_eq!(
        filter_library(&assets, "", Some(AssetType::Prop), None)[0].name,
        "Sword rack"
    );
}
