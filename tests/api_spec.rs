use axum::http::StatusCode;
use axum_test::TestServer;
use accelerator::api::create_router;
use accelerator::db::Database;
use accelerator::models::*;
use serde_json::json;
use uuid::Uuid;

fn setup() -> TestServer {
    let db = Database::open_memory().expect("Failed to create database");
    db.migrate().expect("Failed to migrate");
    let app = create_router(db);
    TestServer::new(app).expect("Failed to create test server")
}

async fn create_folder(server: &TestServer, name: &str, parent_id: Option<Uuid>) -> FolderDetail {
    let response = server
        .post("/api/v1/folders")
        .json(&CreateFolderInput {
            name: name.to_string(),
            description: None,
            parent_id,
        })
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<FolderDetail>()
}

async fn add_feature(server: &TestServer, folder_id: Uuid, name: &str) -> FeatureDetail {
    let response = server
        .post(&format!("/api/v1/folders/{}/features", folder_id))
        .json(&json!({ "name": name }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<FeatureDetail>()
}

mod health {
    use super::*;

    #[tokio::test]
    async fn reports_ok() {
        let server = setup();

        let response = server.get("/api/v1/health").await;

        response.assert_status_ok();
        response.assert_json(&json!({ "status": "ok" }));
    }
}

mod folders {
    use super::*;

    #[tokio::test]
    async fn lists_roots_and_children() {
        let server = setup();
        let a = create_folder(&server, "A", None).await;
        let b = create_folder(&server, "B", Some(a.folder.id)).await;
        create_folder(&server, "C", Some(b.folder.id)).await;

        let roots: Vec<FolderDetail> = server.get("/api/v1/folders/root").await.json();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].folder.id, a.folder.id);
        assert_eq!(roots[0].child_folders[0].name, "B");

        let children: Vec<FolderDetail> = server
            .get(&format!("/api/v1/folders/{}/children", a.folder.id))
            .await
            .json();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].folder.id, b.folder.id);

        let all: Vec<FolderDetail> = server.get("/api/v1/folders").await.json();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn returns_404_for_unknown_folder() {
        let server = setup();

        let response = server.get(&format!("/api/v1/folders/{}", Uuid::new_v4())).await;

        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn returns_404_for_children_of_unknown_folder() {
        let server = setup();

        let response = server
            .get(&format!("/api/v1/folders/{}/children", Uuid::new_v4()))
            .await;

        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn returns_404_when_creating_under_unknown_parent() {
        let server = setup();

        let response = server
            .post("/api/v1/folders")
            .json(&json!({ "name": "Orphan", "parent_id": Uuid::new_v4() }))
            .await;

        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn rejects_blank_names() {
        let server = setup();

        let response = server
            .post("/api/v1/folders")
            .json(&json!({ "name": "  " }))
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn rejects_reparenting_under_a_descendant() {
        let server = setup();
        let a = create_folder(&server, "A", None).await;
        let b = create_folder(&server, "B", Some(a.folder.id)).await;
        let c = create_folder(&server, "C", Some(b.folder.id)).await;

        let response = server
            .put(&format!("/api/v1/folders/{}", a.folder.id))
            .json(&json!({ "name": "A", "parent_id": c.folder.id }))
            .await;

        response.assert_status_bad_request();
        let a_after: FolderDetail = server
            .get(&format!("/api/v1/folders/{}", a.folder.id))
            .await
            .json();
        assert!(a_after.folder.parent_id.is_none());
    }

    #[tokio::test]
    async fn rejects_self_parenting() {
        let server = setup();
        let a = create_folder(&server, "A", None).await;

        let response = server
            .put(&format!("/api/v1/folders/{}", a.folder.id))
            .json(&json!({ "name": "A", "parent_id": a.folder.id }))
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn renames_and_moves_a_folder() {
        let server = setup();
        let a = create_folder(&server, "A", None).await;
        let b = create_folder(&server, "B", None).await;

        let response = server
            .put(&format!("/api/v1/folders/{}", b.folder.id))
            .json(&json!({ "name": "Beta", "description": "moved", "parent_id": a.folder.id }))
            .await;

        response.assert_status_ok();
        let updated: FolderDetail = response.json();
        assert_eq!(updated.folder.name, "Beta");
        assert_eq!(updated.folder.description.as_deref(), Some("moved"));
        assert_eq!(updated.parent_name.as_deref(), Some("A"));
    }

    #[tokio::test]
    async fn deletes_a_subtree() {
        let server = setup();
        let a = create_folder(&server, "A", None).await;
        let b = create_folder(&server, "B", Some(a.folder.id)).await;
        let c = create_folder(&server, "C", Some(b.folder.id)).await;
        let feature = add_feature(&server, c.folder.id, "deep").await;

        let response = server.delete(&format!("/api/v1/folders/{}", a.folder.id)).await;
        response.assert_status(StatusCode::NO_CONTENT);

        let roots: Vec<FolderDetail> = server.get("/api/v1/folders/root").await.json();
        assert!(roots.is_empty());
        for id in [a.folder.id, b.folder.id, c.folder.id] {
            server
                .get(&format!("/api/v1/folders/{}", id))
                .await
                .assert_status_not_found();
        }
        server
            .get(&format!("/api/v1/features/{}", feature.feature.id))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn returns_404_when_deleting_unknown_folder() {
        let server = setup();

        let response = server.delete(&format!("/api/v1/folders/{}", Uuid::new_v4())).await;

        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn searches_by_name() {
        let server = setup();
        create_folder(&server, "Billing", None).await;
        create_folder(&server, "Auth", None).await;

        let found: Vec<FolderDetail> = server
            .get("/api/v1/folders/search")
            .add_query_param("name", "bill")
            .await
            .json();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].folder.name, "Billing");
    }

    #[tokio::test]
    async fn returns_the_tree() {
        let server = setup();
        let a = create_folder(&server, "A", None).await;
        create_folder(&server, "B", Some(a.folder.id)).await;
        add_feature(&server, a.folder.id, "top").await;

        let tree: Vec<FolderTreeNode> = server.get("/api/v1/folders/tree").await.json();

        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].features[0].name, "top");
        assert_eq!(tree[0].children[0].folder.name, "B");
    }
}

mod folder_features {
    use super::*;

    #[tokio::test]
    async fn moves_a_feature_between_folders() {
        let server = setup();
        let x = create_folder(&server, "X", None).await;
        let y = create_folder(&server, "Y", None).await;
        let f1 = add_feature(&server, x.folder.id, "f1").await;

        let response = server
            .put(&format!(
                "/api/v1/folders/{}/features/{}",
                y.folder.id, f1.feature.id
            ))
            .await;

        response.assert_status_ok();
        let moved: FeatureDetail = response.json();
        assert_eq!(moved.feature.folder_id, y.folder.id);
        assert_eq!(moved.folder_name, "Y");

        let x_after: FolderDetail = server
            .get(&format!("/api/v1/folders/{}", x.folder.id))
            .await
            .json();
        assert!(x_after.features.is_empty());

        let in_y: Vec<FeatureDetail> = server
            .get(&format!("/api/v1/features/folder/{}", y.folder.id))
            .await
            .json();
        assert_eq!(in_y.len(), 1);
        assert_eq!(in_y[0].feature.id, f1.feature.id);
    }

    #[tokio::test]
    async fn returns_404_when_moving_to_unknown_folder() {
        let server = setup();
        let x = create_folder(&server, "X", None).await;
        let f1 = add_feature(&server, x.folder.id, "f1").await;

        let response = server
            .put(&format!(
                "/api/v1/folders/{}/features/{}",
                Uuid::new_v4(),
                f1.feature.id
            ))
            .await;

        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn returns_404_when_adding_to_unknown_folder() {
        let server = setup();

        let response = server
            .post(&format!("/api/v1/folders/{}/features", Uuid::new_v4()))
            .json(&json!({ "name": "f1" }))
            .await;

        response.assert_status_not_found();
    }
}

mod features {
    use super::*;

    #[tokio::test]
    async fn creates_a_feature_with_content() {
        let server = setup();
        let x = create_folder(&server, "X", None).await;
        let query: ContentItem = server
            .post("/api/v1/sql-queries")
            .json(&json!({ "name": "totals", "content": "SELECT sum(amount) FROM orders" }))
            .await
            .json();

        let response = server
            .post("/api/v1/features")
            .json(&json!({
                "folder_id": x.folder.id,
                "name": "Revenue report",
                "sql_query_id": query.id,
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let created: FeatureDetail = response.json();
        assert_eq!(created.folder_name, "X");
        assert_eq!(
            created.sql_query.map(|q| q.content),
            Some("SELECT sum(amount) FROM orders".to_string())
        );
        assert!(created.template_prompt.is_none());
    }

    #[tokio::test]
    async fn returns_404_for_unknown_content_reference() {
        let server = setup();
        let x = create_folder(&server, "X", None).await;

        let response = server
            .post("/api/v1/features")
            .json(&json!({
                "folder_id": x.folder.id,
                "name": "Broken",
                "template_prompt_id": Uuid::new_v4(),
            }))
            .await;

        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn distinguishes_null_from_missing_on_update() {
        let server = setup();
        let x = create_folder(&server, "X", None).await;
        let prompt: ContentItem = server
            .post("/api/v1/template-prompts")
            .json(&json!({ "name": "p", "content": "Hello" }))
            .await
            .json();
        let diagram: ContentItem = server
            .post("/api/v1/sequence-diagrams")
            .json(&json!({ "name": "d", "content": "A->>B: hi" }))
            .await
            .json();
        let created: FeatureDetail = server
            .post("/api/v1/features")
            .json(&json!({
                "folder_id": x.folder.id,
                "name": "f",
                "template_prompt_id": prompt.id,
                "sequence_diagram_id": diagram.id,
            }))
            .await
            .json();

        let response = server
            .put(&format!("/api/v1/features/{}", created.feature.id))
            .json(&json!({ "template_prompt_id": null }))
            .await;

        response.assert_status_ok();
        let updated: FeatureDetail = response.json();
        assert!(updated.feature.template_prompt_id.is_none());
        assert_eq!(updated.feature.sequence_diagram_id, Some(diagram.id));
        assert_eq!(updated.feature.name, "f");
    }

    #[tokio::test]
    async fn moves_through_update() {
        let server = setup();
        let x = create_folder(&server, "X", None).await;
        let y = create_folder(&server, "Y", None).await;
        let f = add_feature(&server, x.folder.id, "f").await;

        let updated: FeatureDetail = server
            .put(&format!("/api/v1/features/{}", f.feature.id))
            .json(&json!({ "folder_id": y.folder.id }))
            .await
            .json();

        assert_eq!(updated.feature.folder_id, y.folder.id);
    }

    #[tokio::test]
    async fn deletes_a_feature() {
        let server = setup();
        let x = create_folder(&server, "X", None).await;
        let f = add_feature(&server, x.folder.id, "f").await;

        server
            .delete(&format!("/api/v1/features/{}", f.feature.id))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .delete(&format!("/api/v1/features/{}", f.feature.id))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn searches_by_name() {
        let server = setup();
        let x = create_folder(&server, "X", None).await;
        add_feature(&server, x.folder.id, "Checkout").await;
        add_feature(&server, x.folder.id, "Login").await;

        let found: Vec<FeatureDetail> = server
            .get("/api/v1/features/search")
            .add_query_param("name", "check")
            .await
            .json();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].feature.name, "Checkout");
    }
}

mod content {
    use super::*;

    #[tokio::test]
    async fn supports_crud_for_every_kind() {
        let server = setup();

        for base in [
            "/api/v1/template-prompts",
            "/api/v1/sequence-diagrams",
            "/api/v1/sql-queries",
        ] {
            let response = server
                .post(base)
                .json(&json!({ "name": "first", "content": "v1" }))
                .await;
            response.assert_status(StatusCode::CREATED);
            let item: ContentItem = response.json();

            let listed: Vec<ContentItem> = server.get(base).await.json();
            assert_eq!(listed.len(), 1);

            let updated: ContentItem = server
                .put(&format!("{}/{}", base, item.id))
                .json(&json!({ "name": "second", "content": "v2" }))
                .await
                .json();
            assert_eq!(updated.name, "second");
            assert_eq!(updated.content, "v2");

            server
                .delete(&format!("{}/{}", base, item.id))
                .await
                .assert_status(StatusCode::NO_CONTENT);
            server
                .get(&format!("{}/{}", base, item.id))
                .await
                .assert_status_not_found();
        }
    }

    #[tokio::test]
    async fn does_not_cross_kinds() {
        let server = setup();
        let prompt: ContentItem = server
            .post("/api/v1/template-prompts")
            .json(&json!({ "name": "p", "content": "Hello" }))
            .await
            .json();

        server
            .get(&format!("/api/v1/sql-queries/{}", prompt.id))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn detaches_deleted_content_from_features() {
        let server = setup();
        let x = create_folder(&server, "X", None).await;
        let diagram: ContentItem = server
            .post("/api/v1/sequence-diagrams")
            .json(&json!({ "name": "d", "content": "A->>B: hi" }))
            .await
            .json();
        let f: FeatureDetail = server
            .post(&format!("/api/v1/folders/{}/features", x.folder.id))
            .json(&json!({ "name": "f", "sequence_diagram_id": diagram.id }))
            .await
            .json();

        server
            .delete(&format!("/api/v1/sequence-diagrams/{}", diagram.id))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let after: FeatureDetail = server
            .get(&format!("/api/v1/features/{}", f.feature.id))
            .await
            .json();
        assert!(after.feature.sequence_diagram_id.is_none());
        assert!(after.sequence_diagram.is_none());
    }

    #[tokio::test]
    async fn rejects_blank_names() {
        let server = setup();

        server
            .post("/api/v1/sql-queries")
            .json(&json!({ "name": "", "content": "SELECT 1" }))
            .await
            .assert_status_bad_request();
    }
}

mod deep_tree {
    use super::*;
    use accelerator::hierarchy::MAX_TREE_DEPTH;

    const CHAIN_LEN: usize = 5000;

    fn deepest(node: &FolderTreeNode) -> (usize, &FolderTreeNode) {
        let mut depth = 1;
        let mut current = node;
        while let Some(child) = current.children.first() {
            depth += 1;
            current = child;
        }
        (depth, current)
    }

    #[tokio::test]
    async fn serves_a_deep_chain_in_bounded_pages() {
        let db = Database::open_memory().expect("Failed to create database");
        db.migrate().expect("Failed to migrate");
        let mut ids = Vec::with_capacity(CHAIN_LEN);
        let mut parent_id = None;
        for i in 0..CHAIN_LEN {
            let id = db
                .create_folder(CreateFolderInput {
                    name: format!("level-{}", i),
                    description: None,
                    parent_id,
                })
                .expect("Failed to create folder")
                .folder
                .id;
            ids.push(id);
            parent_id = Some(id);
        }
        let server = TestServer::new(create_router(db)).expect("Failed to create test server");

        let response = server.get("/api/v1/folders/tree").await;
        response.assert_status_ok();
        let tree: Vec<FolderTreeNode> = response.json();
        assert_eq!(tree.len(), 1);
        let (depth, bottom) = deepest(&tree[0]);
        assert_eq!(depth, MAX_TREE_DEPTH);
        assert!(bottom.children_truncated);

        let mut from = bottom.folder.id;
        let mut reached = depth - 1;
        loop {
            let response = server.get(&format!("/api/v1/folders/{}/tree", from)).await;
            response.assert_status_ok();
            let node: FolderTreeNode = response.json();
            let (depth, bottom) = deepest(&node);
            if !bottom.children_truncated {
                reached += depth;
                assert_eq!(bottom.folder.id, ids[CHAIN_LEN - 1]);
                break;
            }
            reached += depth - 1;
            from = bottom.folder.id;
        }
        assert_eq!(reached, CHAIN_LEN);
    }

    #[tokio::test]
    async fn returns_404_for_subtree_of_unknown_folder() {
        let server = setup();

        let response = server
            .get(&format!("/api/v1/folders/{}/tree", Uuid::new_v4()))
            .await;

        response.assert_status_not_found();
    }
}
