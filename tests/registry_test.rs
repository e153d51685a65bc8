mod helpers;

use helpers::sample_root;
use memoria::brain::{discover, BrainRegistry, SyncState, Zone, EMPTY_BRAIN_ID};
use memoria::scan::MemoryDir;

#[tokio::test]
async fn zones_follow_discovery_order() {
    let brains = discover(&sample_root()).await.unwrap();
    let summary: Vec<(&str, Zone)> = brains.iter().map(|b| (b.name.as_str(), b.zone)).collect();
    assert_eq!(
        summary,
        vec![
            ("alpha", Zone::Singularity),
            ("beta", Zone::EventHorizon),
            ("gamma", Zone::DeepVoid),
        ]
    );

    // Reversed listing: same folders, zones re-assigned by position.
    let brains = discover(&sample_root().reversed()).await.unwrap();
    assert_eq!(brains[0].name, "gamma");
    assert_eq!(brains[0].zone, Zone::Singularity);
    assert_eq!(brains[2].name, "alpha");
    assert_eq!(brains[2].zone, Zone::DeepVoid);
}

#[tokio::test]
async fn brain_fields_reflect_the_scan() {
    let brains = discover(&sample_root()).await.unwrap();

    let alpha = &brains[0];
    assert_eq!(alpha.id, "local_alpha");
    assert_eq!(alpha.local_path, "./alpha");
    assert_eq!(alpha.mass_bytes, 8);
    assert_eq!(alpha.neuron_count, 2);
    assert_eq!(alpha.state, SyncState::Coherent);
    assert_eq!(alpha.generation, 1);
    assert!(alpha.peers.is_empty());
    assert!(alpha.active_lock.is_none());

    let gamma = &brains[2];
    assert_eq!(gamma.neuron_count, 0);
    assert_eq!(gamma.state, SyncState::Stabilizing);
}

#[tokio::test]
async fn files_at_the_root_are_not_brains() {
    let root = MemoryDir::new("root")
        .file("README.md", "hi")
        .dir(MemoryDir::new("only").file("a.md", "a"));
    let brains = discover(&root).await.unwrap();
    assert_eq!(brains.len(), 1);
    assert_eq!(brains[0].name, "only");
}

#[tokio::test]
async fn hidden_and_node_modules_roots_yield_placeholder() {
    let root = MemoryDir::new("root")
        .file("loose.txt", "x")
        .dir(MemoryDir::new(".cache").file("a", "a"))
        .dir(MemoryDir::new("node_modules").file("b", "b"));
    let brains = discover(&root).await.unwrap();

    assert_eq!(brains.len(), 1);
    let placeholder = &brains[0];
    assert_eq!(placeholder.id, EMPTY_BRAIN_ID);
    assert!(placeholder.is_placeholder());
    assert_eq!(placeholder.state, SyncState::Decoherent);
    assert_eq!(placeholder.zone, Zone::DeepVoid);
}

#[tokio::test]
async fn empty_root_yields_placeholder() {
    let brains = discover(&MemoryDir::new("root")).await.unwrap();
    assert_eq!(brains.len(), 1);
    assert!(brains[0].is_placeholder());

    let mut registry = BrainRegistry::new();
    registry.replace(brains);
    assert!(registry.is_empty_result());
    assert_eq!(registry.total_bytes(), 0);
}

#[tokio::test]
async fn ignored_names_at_top_level_other_than_dot_and_node_modules_are_brains() {
    // `dist` is skipped inside a brain but is a legitimate brain name at the top.
    let root = MemoryDir::new("root").dir(MemoryDir::new("dist").file("a.md", "a"));
    let brains = discover(&root).await.unwrap();
    assert_eq!(brains.len(), 1);
    assert_eq!(brains[0].name, "dist");
    assert_eq!(brains[0].neuron_count, 1);
}

#[tokio::test]
async fn unreadable_brain_folder_is_skipped() {
    let root = MemoryDir::new("root")
        .dir(MemoryDir::new("locked").file("a.md", "a").denied())
        .dir(MemoryDir::new("open").file("b.md", "b"));
    let brains = discover(&root).await.unwrap();
    assert_eq!(brains.len(), 1);
    assert_eq!(brains[0].name, "open");
    assert_eq!(brains[0].zone, Zone::Singularity);
}

#[tokio::test]
async fn unlistable_root_is_an_error() {
    let root = sample_root().denied();
    assert!(discover(&root).await.is_err());
}

#[tokio::test]
async fn rescan_replaces_registry() {
    let mut registry = BrainRegistry::new();
    registry.replace(discover(&sample_root()).await.unwrap());
    assert_eq!(registry.brains().len(), 3);
    assert_eq!(registry.total_files(), 3);
    assert!(registry.get("local_beta").is_some());

    let smaller = MemoryDir::new("root").dir(MemoryDir::new("beta").file("plan.md", "plan"));
    registry.replace(discover(&smaller).await.unwrap());
    assert_eq!(registry.brains().len(), 1);
    assert!(registry.get("local_alpha").is_none());
    assert_eq!(registry.brains()[0].zone, Zone::Singularity);
}
