//! Tree assembly and breadcrumb scenarios over the in-memory store.

mod common;

use docwiki_core::error::ErrorKind;

use common::{create, setup};

#[tokio::test]
async fn test_tree_structure_and_document_totals() {
    let (service, tree_service, store) = setup();
    let docs = create(&service, None, "Docs").await;
    let guides = create(&service, Some(docs.id), "Guides").await;
    let notes = create(&service, Some(docs.id), "Notes").await;
    let setup_dir = create(&service, Some(guides.id), "Setup").await;

    store.seed_document_count(docs.id, 2).await;
    store.seed_document_count(guides.id, 3).await;
    store.seed_document_count(setup_dir.id, 5).await;

    let forest = tree_service.tree().await.unwrap();
    assert_eq!(forest.len(), 1);

    let root = &forest[0];
    assert_eq!(root.id, docs.id);
    assert_eq!(root.level, 1);
    assert_eq!(root.document_count, 2);
    assert_eq!(root.total_document_count, 10);
    assert_eq!(root.children.len(), 2);

    let guides_node = &root.children[0];
    assert_eq!(guides_node.id, guides.id);
    assert_eq!(guides_node.total_document_count, 8);
    assert_eq!(guides_node.children[0].id, setup_dir.id);
    assert_eq!(guides_node.children[0].level, 3);

    let notes_node = &root.children[1];
    assert_eq!(notes_node.id, notes.id);
    assert_eq!(notes_node.total_document_count, 0);
}

#[tokio::test]
async fn test_tree_sibling_order_follows_reorder() {
    let (service, tree_service, _) = setup();
    let a = create(&service, None, "A").await;
    let b = create(&service, None, "B").await;
    let c = create(&service, None, "C").await;

    service.reorder(None, &[b.id, c.id, a.id]).await.unwrap();

    let forest = tree_service.tree().await.unwrap();
    let ids: Vec<i64> = forest.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![b.id, c.id, a.id]);
}

#[tokio::test]
async fn test_subtree_scopes_to_descendants() {
    let (service, tree_service, store) = setup();
    let docs = create(&service, None, "Docs").await;
    let guides = create(&service, Some(docs.id), "Guides").await;
    let setup_dir = create(&service, Some(guides.id), "Setup").await;
    create(&service, None, "Unrelated").await;

    store.seed_document_count(setup_dir.id, 4).await;

    let node = tree_service.subtree(guides.id).await.unwrap();
    assert_eq!(node.id, guides.id);
    assert_eq!(node.children.len(), 1);
    assert_eq!(node.total_document_count, 4);

    let err = tree_service.subtree(999).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_breadcrumbs_reconstruct_ancestor_chain() {
    let (service, tree_service, _) = setup();
    let docs = create(&service, None, "Docs").await;
    let guides = create(&service, Some(docs.id), "Guides").await;
    let setup_dir = create(&service, Some(guides.id), "Setup").await;

    let trail = tree_service.breadcrumbs(setup_dir.id).await.unwrap();
    assert_eq!(trail.len(), 3);
    assert_eq!(trail[0].name, "Docs");
    assert_eq!(trail[0].path, "/Docs");
    assert_eq!(trail[1].path, "/Docs/Guides");
    assert_eq!(trail[2].path, "/Docs/Guides/Setup");
    assert_eq!(trail[2].level, 3);

    let err = tree_service.breadcrumbs(999).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_breadcrumbs_track_moves() {
    let (service, tree_service, _) = setup();
    let docs = create(&service, None, "Docs").await;
    let guides = create(&service, Some(docs.id), "Guides").await;
    let setup_dir = create(&service, Some(guides.id), "Setup").await;

    service.move_directory(guides.id, None, None).await.unwrap();

    let trail = tree_service.breadcrumbs(setup_dir.id).await.unwrap();
    let paths: Vec<&str> = trail.iter().map(|s| s.path.as_str()).collect();
    assert_eq!(paths, vec!["/Guides", "/Guides/Setup"]);
}
