//! End-to-end tests against tastypie-shaped payloads.

use serde_json::{Value, json};
use tastypie_core::{
    AdapterConfig, ConfigRegistry, Dialect, Embedded, EntityType, Extracted, KeyKind, KeyStyle,
    MemoryStore, NormalizeError, PageMeta, ReferenceStyle, Relationship, RequestKind, Schema,
    SerializeOptions, Serializer, Settings, Snapshot, Strictness, UriCodec, WireObject, uri,
};

fn object(value: Value) -> WireObject {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected object"),
    }
}

/// The villain schema used throughout: planets house villains, villains
/// command minions.
fn villains() -> Schema {
    Schema::new()
        .with(
            EntityType::new("homePlanet")
                .attribute("name")
                .has_many("villains", "superVillain"),
        )
        .with(
            EntityType::new("superVillain")
                .attribute("firstName")
                .attribute("lastName")
                .belongs_to("homePlanet", "homePlanet")
                .has_many("evilMinions", "evilMinion"),
        )
        .with(
            EntityType::new("evilMinion")
                .attribute("name")
                .belongs_to("superVillain", "superVillain"),
        )
        .with(EntityType::new("yellowMinion").attribute("name"))
}

#[test]
fn serialize_then_normalize_round_trips() {
    let serializer = Serializer::new(villains(), UriCodec::new("api/v1"));

    let tom = Snapshot::new("superVillain")
        .with_id("1")
        .attr("firstName", "Tom")
        .attr("lastName", "Dale")
        .belongs_to("homePlanet", Some(Snapshot::new("homePlanet").with_id("123")))
        .has_many(
            "evilMinions",
            vec![
                Snapshot::new("evilMinion").with_id("3"),
                Snapshot::new("evilMinion").with_id("4"),
            ],
        );

    let wire = serializer.serialize(&tom, SerializeOptions::with_id()).unwrap();
    assert_eq!(
        Value::Object(wire.clone()),
        json!({
            "id": "1",
            "first_name": "Tom",
            "last_name": "Dale",
            "home_planet_id": "/api/v1/homePlanet/123/",
            "evil_minions": ["/api/v1/evilMinion/3/", "/api/v1/evilMinion/4/"]
        })
    );

    let normalized = serializer.normalize("superVillain", wire).unwrap();
    assert_eq!(
        Value::Object(normalized.record),
        json!({
            "id": "1",
            "firstName": "Tom",
            "lastName": "Dale",
            "homePlanet": "123",
            "evilMinions": ["3", "4"]
        })
    );
    assert!(normalized.sideloaded.is_empty());
}

#[test]
fn embedded_children_of_same_type() {
    let schema = Schema::new().with(
        EntityType::new("category")
            .attribute("name")
            .has_many("children", "category"),
    );
    let serializer = Serializer::new(schema, UriCodec::new("api/v1")).with_configs(
        ConfigRegistry::new().with("category", AdapterConfig::new().embedded("children", Embedded::Always)),
    );

    let normalized = serializer
        .normalize(
            "category",
            object(json!({
                "id": "1",
                "name": "Root",
                "children": [
                    { "id": "2", "name": "Left", "resource_uri": "/api/v1/category/2/" },
                    { "id": "3", "name": "Right", "resource_uri": "/api/v1/category/3/" }
                ],
                "resource_uri": "/api/v1/category/1/"
            })),
        )
        .unwrap();

    assert_eq!(normalized.record["children"], json!(["2", "3"]));
    assert_eq!(normalized.sideloaded.len(), 2);
    assert!(normalized.sideloaded.iter().all(|s| s.entity == "category"));
    assert_eq!(
        Value::Object(normalized.sideloaded[0].record.clone()),
        json!({ "id": "2", "name": "Left", "children": [] })
    );
}

#[test]
fn three_level_embedding_side_loads_every_level() {
    let configs = ConfigRegistry::new()
        .with("homePlanet", AdapterConfig::new().embedded("villains", Embedded::Always))
        .with("superVillain", AdapterConfig::new().embedded("evilMinions", Embedded::Always));
    let serializer = Serializer::new(villains(), UriCodec::new("api/v1")).with_configs(configs);

    let normalized = serializer
        .normalize(
            "homePlanet",
            object(json!({
                "id": "1",
                "name": "Villain League",
                "villains": [{
                    "id": "1",
                    "first_name": "Tom",
                    "last_name": "Dale",
                    "home_planet_id": "/api/v1/homePlanet/1/",
                    "evil_minions": [{
                        "id": "1",
                        "name": "Alex",
                        "super_villain_id": "/api/v1/superVillain/1/"
                    }]
                }]
            })),
        )
        .unwrap();

    assert_eq!(
        Value::Object(normalized.record),
        json!({ "id": "1", "name": "Villain League", "villains": ["1"] })
    );

    let entities: Vec<_> = normalized.sideloaded.iter().map(|s| s.entity.as_str()).collect();
    assert_eq!(entities, ["evilMinion", "superVillain"]);

    assert_eq!(
        Value::Object(normalized.sideloaded[0].record.clone()),
        json!({ "id": "1", "name": "Alex", "superVillain": "1" })
    );
    assert_eq!(
        Value::Object(normalized.sideloaded[1].record.clone()),
        json!({
            "id": "1",
            "firstName": "Tom",
            "lastName": "Dale",
            "homePlanet": "1",
            "evilMinions": ["1"]
        })
    );
}

#[test]
fn nested_comments_come_out_children_first() {
    let schema = Schema::new().with(
        EntityType::new("comment")
            .attribute("body")
            .has_many("comments", "comment"),
    );
    let serializer = Serializer::new(schema, UriCodec::new("api/v1")).with_configs(
        ConfigRegistry::new().with("comment", AdapterConfig::new().embedded("comments", Embedded::Always)),
    );

    let normalized = serializer
        .normalize(
            "comment",
            object(json!({
                "id": "1",
                "body": "root",
                "comments": [{
                    "id": "2",
                    "body": "reply",
                    "comments": [{ "id": "3", "body": "reply to reply", "comments": [] }]
                }]
            })),
        )
        .unwrap();

    assert_eq!(normalized.record["comments"], json!(["2"]));
    let ids: Vec<_> = normalized.sideloaded.iter().map(|s| s.record["id"].clone()).collect();
    assert_eq!(ids, [json!("3"), json!("2")]);
    assert_eq!(normalized.sideloaded[1].record["comments"], json!(["3"]));
}

#[test]
fn course_with_two_embedded_relationships() {
    let schema = Schema::new()
        .with(
            EntityType::new("course")
                .attribute("title")
                .belongs_to("instructor", "person")
                .has_many("lessons", "lesson"),
        )
        .with(EntityType::new("person").attribute("name"))
        .with(EntityType::new("lesson").attribute("title"));
    let configs = ConfigRegistry::new().with(
        "course",
        AdapterConfig::new()
            .embedded("instructor", Embedded::Load)
            .embedded("lessons", Embedded::Load),
    );
    let serializer = Serializer::new(schema, UriCodec::new("api/v1")).with_configs(configs);

    let normalized = serializer
        .normalize(
            "course",
            object(json!({
                "id": "1",
                "title": "Systems Programming",
                "instructor": { "id": "7", "name": "Ferris" },
                "lessons": [
                    { "id": "1", "title": "Ownership" },
                    { "id": "2", "title": "Borrowing" }
                ]
            })),
        )
        .unwrap();

    assert_eq!(
        Value::Object(normalized.record),
        json!({
            "id": "1",
            "title": "Systems Programming",
            "instructor": "7",
            "lessons": ["1", "2"]
        })
    );
    let entities: Vec<_> = normalized.sideloaded.iter().map(|s| s.entity.as_str()).collect();
    assert_eq!(entities, ["person", "lesson", "lesson"]);
}

#[test]
fn polymorphic_belongs_to_carries_concrete_type() {
    let schema = villains().with(
        EntityType::new("lair").relationship("evilMinion", Relationship::belongs_to("evilMinion").polymorphic()),
    );
    let minion = Snapshot::new("yellowMinion").with_id("124");
    let lair = Snapshot::new("lair").belongs_to("evilMinion", Some(minion));

    let plain_ids = Settings {
        dialect: Dialect {
            key_style: KeyStyle::Preserve,
            belongs_to_suffix: None,
            reference_style: ReferenceStyle::Id,
            ..Dialect::default()
        },
        ..Settings::default()
    };
    let serializer = Serializer::new(schema.clone(), UriCodec::new("api/v1")).with_settings(plain_ids);
    assert_eq!(
        Value::Object(serializer.serialize(&lair, SerializeOptions::default()).unwrap()),
        json!({ "evilMinionType": "yellowMinion", "evilMinion": "124" })
    );

    let serializer = Serializer::new(schema, UriCodec::new("api/v1"));
    assert_eq!(
        Value::Object(serializer.serialize(&lair, SerializeOptions::default()).unwrap()),
        json!({
            "evil_minion_id": "/api/v1/evilMinion/124/",
            "evilMinionType": "yellowMinion"
        })
    );

    let empty = Snapshot::new("lair").belongs_to("evilMinion", None);
    assert_eq!(
        Value::Object(serializer.serialize(&empty, SerializeOptions::default()).unwrap()),
        json!({ "evil_minion_id": null, "evilMinionType": null })
    );
}

#[test]
fn paginated_collection() {
    let schema = Schema::new().with(EntityType::new("person").attribute("name"));
    let serializer = Serializer::new(schema, UriCodec::new("api/v1"));

    let collection = serializer
        .normalize_collection(
            "person",
            object(json!({
                "meta": {
                    "limit": 2,
                    "next": "/api/v1/person/?limit=2&offset=2",
                    "offset": 0,
                    "previous": null,
                    "total_count": 25
                },
                "objects": [
                    { "id": "1", "name": "Roy", "resource_uri": "/api/v1/person/1/" },
                    { "id": "2", "name": "Moss", "resource_uri": "/api/v1/person/2/" }
                ]
            })),
        )
        .unwrap();

    let names: Vec<_> = collection.records.iter().map(|r| r["name"].clone()).collect();
    assert_eq!(names, [json!("Roy"), json!("Moss")]);

    let meta = collection.meta.unwrap();
    assert_eq!(
        meta,
        PageMeta {
            limit: Some(2),
            offset: Some(0),
            total_count: Some(25),
            next: Some("/api/v1/person/?limit=2&offset=2".to_string()),
            previous: None,
        }
    );
    assert_eq!(meta.next_offset(), Some(2));
    assert!(!collection.remainder.contains_key("meta"));
    assert!(!collection.remainder.contains_key("objects"));
}

#[test]
fn custom_key_maps_both_ways() {
    let schema = Schema::new().with(EntityType::new("person").attribute("name"));
    let serializer = Serializer::new(schema, UriCodec::new("api/v1"))
        .with_configs(ConfigRegistry::new().with("person", AdapterConfig::new().key("name", "name_custom")));

    let normalized = serializer
        .normalize("person", object(json!({ "id": "1", "name_custom": "Roy" })))
        .unwrap();
    assert_eq!(Value::Object(normalized.record), json!({ "id": "1", "name": "Roy" }));

    let wire = serializer
        .serialize(&Snapshot::new("person").attr("name", "Roy"), SerializeOptions::default())
        .unwrap();
    assert_eq!(Value::Object(wire), json!({ "name_custom": "Roy" }));

    assert_eq!(
        serializer.wire_key_for("person", "name", KeyKind::Attribute),
        serializer.wire_key_for("person", "name", KeyKind::Attribute)
    );
}

#[test]
fn camel_case_embedded_key() {
    let schema = Schema::new()
        .with(EntityType::new("person").attribute("name").has_many("tasksToDo", "task"))
        .with(EntityType::new("task").attribute("name"));

    let declared = Serializer::new(schema.clone(), UriCodec::new("api/v1")).with_configs(
        ConfigRegistry::new().with(
            "person",
            AdapterConfig::new()
                .embedded("tasksToDo", Embedded::Load)
                .key("tasksToDo", "tasksToDo"),
        ),
    );
    let payload = json!({
        "id": "1",
        "name": "Maurice Moss",
        "tasksToDo": [{ "id": "1", "name": "Learn German Kitchen" }]
    });

    let normalized = declared.normalize("person", object(payload.clone())).unwrap();
    assert_eq!(normalized.record["tasksToDo"], json!(["1"]));
    assert_eq!(normalized.sideloaded.len(), 1);

    let wire = declared
        .serialize(
            &Snapshot::new("person")
                .attr("name", "Maurice Moss")
                .has_many("tasksToDo", vec![Snapshot::new("task").with_id("1")]),
            SerializeOptions::default(),
        )
        .unwrap();
    assert_eq!(wire["tasksToDo"], json!(["/api/v1/task/1/"]));

    // Without a declared key the internal name is still accepted.
    let undeclared = Serializer::new(schema, UriCodec::new("api/v1")).with_configs(
        ConfigRegistry::new().with("person", AdapterConfig::new().embedded("tasksToDo", Embedded::Load)),
    );
    let normalized = undeclared.normalize("person", object(payload)).unwrap();
    assert_eq!(normalized.record["tasksToDo"], json!(["1"]));
}

#[test]
fn cyclic_embedding_fails_fast() {
    let schema = Schema::new().with(EntityType::new("node").belongs_to("next", "node"));
    let serializer = Serializer::new(schema, UriCodec::new("api/v1"))
        .with_configs(ConfigRegistry::new().with("node", AdapterConfig::new().embedded("next", Embedded::Always)))
        .with_settings(Settings {
            max_depth: 2,
            ..Settings::default()
        });

    let err = serializer
        .normalize(
            "node",
            object(json!({
                "id": "0",
                "next": { "id": "1", "next": { "id": "2", "next": { "id": "3" } } }
            })),
        )
        .unwrap_err();

    assert_eq!(
        err,
        NormalizeError::DepthExceeded {
            entity: "node".to_string(),
            depth: 3
        }
    );
}

#[test]
fn strict_mode_rejects_what_permissive_passes() {
    let schema = villains();
    let payload = json!({ "id": "1", "name": "Alex", "super_villain_id": ["/api/v1/superVillain/1/"] });

    let permissive = Serializer::new(schema.clone(), UriCodec::new("api/v1"));
    let normalized = permissive.normalize("evilMinion", object(payload.clone())).unwrap();
    assert_eq!(normalized.record["superVillain"], json!(["/api/v1/superVillain/1/"]));

    let strict = Serializer::new(schema, UriCodec::new("api/v1")).with_settings(Settings {
        strictness: Strictness::Strict,
        ..Settings::default()
    });
    let err = strict.normalize("evilMinion", object(payload)).unwrap_err();
    assert!(matches!(err, NormalizeError::MalformedReference { ref field, .. } if field == "superVillain"));
}

#[test]
fn uri_round_trip() {
    for (namespace, resource, id) in [
        ("api/v1", "person", "1"),
        ("/api/v2/", "superVillain", "abc-123"),
        ("v1", "task", "42"),
    ] {
        let built = uri::build(namespace, resource, Some(id));
        assert!(built.ends_with('/'));
        assert_eq!(uri::parse_id(&built), id);
        assert_eq!(uri::parse_id_strict(&built), Ok(id));
    }
}

#[test]
fn request_urls() {
    let schema = Schema::new().with(EntityType::new("person")).with(EntityType::new("group").resource("groups"));
    let serializer = Serializer::new(schema, UriCodec::new("api/v1").with_host("http://localhost:8000/"));

    assert_eq!(serializer.build_url("person", Some("1")), "http://localhost:8000/api/v1/person/1/");
    assert_eq!(serializer.build_url("group", None), "http://localhost:8000/api/v1/groups/");
    assert_eq!(
        serializer.build_many_url("person", ["1", "2", "3"]),
        "http://localhost:8000/api/v1/person/set/1;2;3/"
    );
}

#[test]
fn extraction_pushes_side_loaded_records_in_one_batch() {
    let configs = ConfigRegistry::new().with("superVillain", AdapterConfig::new().embedded("evilMinions", Embedded::Load));
    let serializer = Serializer::new(villains(), UriCodec::new("api/v1")).with_configs(configs);
    let store = MemoryStore::new();

    let payload = json!({
        "meta": { "limit": 2, "next": "/api/v1/superVillain/?limit=2&offset=2", "offset": 0, "total_count": 3 },
        "objects": [
            {
                "id": "1",
                "first_name": "Tom",
                "evil_minions": [{ "id": "10", "name": "Alex" }, { "id": "11", "name": "Bob" }]
            },
            {
                "id": "2",
                "first_name": "Yehuda",
                "evil_minions": [{ "id": "12", "name": "Kevin" }]
            }
        ]
    });

    let extracted = serializer
        .extract(&store, RequestKind::FindAll, "superVillain", payload)
        .unwrap();

    assert!(matches!(extracted, Extracted::Many(ref records) if records.len() == 2));
    // one batch for side-loaded minions, one for the villains
    assert_eq!(store.batches(), 2);
    assert_eq!(store.ids("evilMinion"), ["10", "11", "12"]);
    assert_eq!(store.ids("superVillain"), ["1", "2"]);
    assert_eq!(store.get("superVillain", "2").unwrap()["evilMinions"], json!(["12"]));
    assert_eq!(store.metadata("superVillain").and_then(|m| m.next_offset()), Some(2));
}

#[test]
fn extraction_of_create_response() {
    let serializer = Serializer::new(villains(), UriCodec::new("api/v1"));
    let store = MemoryStore::new();

    let extracted = serializer
        .extract(
            &store,
            RequestKind::CreateRecord,
            "evilMinion",
            json!({ "evilMinion": { "name": "Alex", "resource_uri": "/api/v1/evilMinion/5/" } }),
        )
        .unwrap();

    assert_eq!(extracted.records()[0]["id"], json!("5"));
    assert_eq!(store.get("evilMinion", "5").unwrap()["name"], json!("Alex"));
    assert_eq!(store.batches(), 1);
}
