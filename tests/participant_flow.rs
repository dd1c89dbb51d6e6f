//! End-to-end participant flow: author, publish, render and respond

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::{Map, Value, json};
use survey_studio::api::{MemoryDocumentStore, StoreError};
use survey_studio::images::{NamedImage, StaticImageProvider};
use survey_studio::participant::{ResponseRecord, load_runtime, submit_response};
use survey_studio::reconcile::ProjectController;
use survey_studio::session::{MemoryMirror, SessionCache};
use survey_studio::survey::{ImageDatasetConfig, ImageMatrix, ImageSpec, Question};

fn pool(size: usize) -> Vec<NamedImage> {
    (0..size)
        .map(|i| NamedImage {
            name: format!("scene_{}.png", i),
            url: format!("https://cdn.example/scene_{}.png", i),
        })
        .collect()
}

#[tokio::test]
async fn test_published_survey_collects_response() {
    let store = MemoryDocumentStore::new();
    let mut controller =
        ProjectController::new(store.clone(), SessionCache::new(Box::new(MemoryMirror::new())));

    let activation = controller.create_project("Scenes").await.unwrap();
    let project_id = activation.project.id.clone();

    controller
        .stage_image_dataset(&project_id, ImageDatasetConfig::with_images(pool(6)))
        .unwrap();
    controller
        .update_draft(&project_id, |draft| {
            let mut spec = ImageSpec::new("scene_grid");
            spec.random_image_selection = true;
            spec.image_count = Some(2);
            draft.pages[0].elements.push(Question::ImageMatrix(ImageMatrix {
                spec,
                rows: vec![json!("safe"), json!("lively")],
                columns: vec![json!(1), json!(2), json!(3)],
                ..Default::default()
            }));
            Ok(())
        })
        .unwrap();
    controller.persist(&project_id).await.unwrap();

    let mut rng = StdRng::seed_from_u64(5);
    let runtime = load_runtime(&store, &StaticImageProvider::new(), &project_id, &mut rng)
        .await
        .unwrap();
    let shown = runtime.displayed_images["scene_grid"].clone();
    assert_eq!(shown.len(), 2);

    let mut answers = Map::new();
    answers.insert("scene_grid".to_string(), json!({ "safe": 2, "lively": 3 }));
    let record = ResponseRecord::new(&project_id, &runtime, answers, None)
        .with_user_agent("integration-test");
    assert!(record.unknown_answers(&runtime).is_empty());

    let key = submit_response(&store, &record).await.unwrap();
    let stored = store.responses();
    let saved = &stored[&key];
    assert_eq!(saved.displayed_images["scene_grid"], shown);
    assert_eq!(saved.survey_metadata.project_id, project_id);

    let wire: Value = serde_json::to_value(saved).unwrap();
    assert!(wire["survey_metadata"]["completion_time"].is_string());
    assert_eq!(wire["survey_metadata"]["user_agent"], "integration-test");
}

#[tokio::test]
async fn test_offline_store_rejects_response() {
    let store = MemoryDocumentStore::new();
    let mut controller =
        ProjectController::new(store.clone(), SessionCache::new(Box::new(MemoryMirror::new())));
    let project_id = controller.create_project("Offline").await.unwrap().project.id;

    let mut rng = StdRng::seed_from_u64(1);
    let runtime = load_runtime(&store, &StaticImageProvider::new(), &project_id, &mut rng)
        .await
        .unwrap();
    let record = ResponseRecord::new(&project_id, &runtime, Map::new(), Some("p-7".to_string()));

    store.set_offline(true);
    let err = submit_response(&store, &record).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<StoreError>(),
        Some(StoreError::Unavailable(_))
    ));
    assert!(store.responses().is_empty());
}
