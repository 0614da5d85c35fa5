use crudscope::{
    FilterStyle, KeyFieldType, MutationKind, Operator, OrderBy, Overrides, PaginationStyle,
    Predicate, ResponsePaginationStyle, SchemaAdapter, SortStyle, SubsetRequest, discover,
    plan_infinite_query, synthesize_translator,
};
use crudscope_openapi::OpenApiAdapter;
use serde_json::json;

fn petstore() -> OpenApiAdapter {
    OpenApiAdapter::from_json_str(include_str!("fixtures/petstore.json")).unwrap()
}

#[test]
fn list_candidates_skip_item_paths() {
    let adapter = petstore();
    let names: Vec<&str> = adapter
        .list_queries()
        .iter()
        .map(|q| q.operation_name.as_str())
        .collect();
    assert_eq!(names, ["listPets", "listOwners", "listTags"]);

    let pets = &adapter.list_queries()[0];
    assert_eq!(pets.query_key, ["pets"]);
    assert_eq!(pets.params_type_name.as_deref(), Some("ListPetsParams"));
    assert_eq!(pets.arguments.len(), 5);
}

#[test]
fn pet_entity() {
    let result = discover(&petstore(), &Overrides::default());
    let pet = result.entity("Pet").expect("Pet discovered");

    assert_eq!(pet.key_field, "id");
    assert_eq!(pet.key_field_type, KeyFieldType::String);
    assert_eq!(pet.list_query.operation_name, "listPets");
    assert_eq!(pet.list_query.selector_path.as_deref(), Some("data"));

    let kinds: Vec<MutationKind> = pet.mutations.iter().map(|m| m.kind).collect();
    assert_eq!(
        kinds,
        [MutationKind::Insert, MutationKind::Update, MutationKind::Delete]
    );
    let create = pet.mutation(MutationKind::Insert).unwrap();
    assert_eq!(create.input_type_name.as_deref(), Some("NewPet"));
    let update = pet.mutation(MutationKind::Update).unwrap();
    assert_eq!(update.path_param_name.as_deref(), Some("petId"));
    assert_eq!(update.input_type_name.as_deref(), Some("NewPet"));
    let delete = pet.mutation(MutationKind::Delete).unwrap();
    assert_eq!(delete.path_param_name.as_deref(), Some("petId"));
}

#[test]
fn pet_capabilities() {
    let result = discover(&petstore(), &Overrides::default());
    let pet = result.entity("Pet").unwrap();

    assert_eq!(pet.filter_capabilities.filter_style, Some(FilterStyle::RestSimple));
    assert_eq!(pet.sort_capabilities.sort_param_name.as_deref(), Some("sort"));
    assert_eq!(pet.sort_capabilities.sort_style, Some(SortStyle::Plain));
    assert_eq!(pet.pagination_capabilities.style, PaginationStyle::Offset);
    assert_eq!(pet.pagination_response.style, ResponsePaginationStyle::Offset);
    assert_eq!(pet.pagination_response.total_path.as_deref(), Some("total"));

    let plan = plan_infinite_query(pet, None).unwrap();
    insta::assert_snapshot!(
        plan.next_page.expression(),
        @"lastPageParam + limit < lastPage.total ? lastPageParam + limit : undefined"
    );
}

#[test]
fn owner_entity_uses_entity_id_key_and_jsonapi_filters() {
    let result = discover(&petstore(), &Overrides::default());
    let owner = result.entity("Owner").expect("Owner discovered");

    assert_eq!(owner.key_field, "ownerId");
    assert_eq!(owner.key_field_type, KeyFieldType::Number);
    assert_eq!(owner.list_query.selector_path.as_deref(), Some("items"));
    assert!(owner.mutations.is_empty());
    assert_eq!(owner.filter_capabilities.filter_style, Some(FilterStyle::JsonApi));
    assert_eq!(owner.pagination_capabilities.style, PaginationStyle::Cursor);
    assert_eq!(
        owner.pagination_response.next_cursor_path.as_deref(),
        Some("meta.next_cursor")
    );

    let plan = plan_infinite_query(owner, None).unwrap();
    insta::assert_snapshot!(
        plan.next_page.expression(),
        @"lastPage.meta.has_more ? lastPage.meta.next_cursor : undefined"
    );
}

#[test]
fn keyless_type_is_skipped_with_one_warning() {
    let result = discover(&petstore(), &Overrides::default());
    assert!(result.entity("Tag").is_none());
    let mentions: Vec<&String> = result
        .warnings
        .iter()
        .filter(|w| w.contains("Tag"))
        .collect();
    assert_eq!(mentions.len(), 1, "{:?}", result.warnings);
    assert_eq!(result.warnings.len(), 1, "{:?}", result.warnings);
}

#[test]
fn discovery_is_idempotent() {
    let adapter = petstore();
    let first = serde_json::to_string(&discover(&adapter, &Overrides::default())).unwrap();
    let second = serde_json::to_string(&discover(&adapter, &Overrides::default())).unwrap();
    assert_eq!(first, second);

    let reparsed = serde_json::to_string(&discover(&petstore(), &Overrides::default())).unwrap();
    assert_eq!(first, reparsed);
}

#[test]
fn translate_rest_simple_request() {
    let result = discover(&petstore(), &Overrides::default());
    let translator = synthesize_translator(result.entity("Pet").unwrap()).unwrap();

    let request = SubsetRequest {
        filter: Some(Predicate::and(vec![
            Predicate::compare("status", Operator::Eq, "sold"),
            Predicate::compare("price", Operator::Gte, 10),
        ])),
        order_by: vec![OrderBy::desc("price"), OrderBy::asc("name")],
        limit: Some(20),
        offset: Some(40),
        cursor: None,
    };
    let args = translator.translate(&request).unwrap();
    assert_eq!(
        serde_json::Value::Object(args),
        json!({
            "status_eq": "sold",
            "price_gte": "10",
            "sort": "-price,name",
            "limit": 20,
            "offset": 40
        })
    );
}

#[test]
fn overrides_apply_through_operation_name() {
    let overrides = Overrides::from_toml_str(
        r#"
[entities.listTags]
keyField = "label"
"#,
    )
    .unwrap();
    let result = discover(&petstore(), &overrides);
    let tag = result.entity("Tag").expect("override supplies a key");
    assert_eq!(tag.key_field, "label");
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
}

#[test]
fn deep_object_filter_param_is_rest_simple() {
    let adapter = OpenApiAdapter::from_value(&json!({
        "openapi": "3.0.3",
        "info": { "title": "Shelter", "version": "1" },
        "paths": {
            "/pets": {
                "get": {
                    "operationId": "listPets",
                    "parameters": [
                        {
                            "name": "filter",
                            "in": "query",
                            "style": "deepObject",
                            "schema": {
                                "type": "object",
                                "properties": { "status": { "type": "string" } }
                            }
                        },
                        { "name": "limit", "in": "query", "schema": { "type": "integer" } },
                        { "name": "offset", "in": "query", "schema": { "type": "integer" } }
                    ],
                    "responses": {
                        "200": {
                            "description": "ok",
                            "content": { "application/json": { "schema": {
                                "type": "array",
                                "items": { "$ref": "#/components/schemas/Pet" }
                            } } }
                        }
                    }
                }
            }
        },
        "components": { "schemas": { "Pet": {
            "type": "object",
            "required": ["id"],
            "properties": { "id": { "type": "string" }, "status": { "type": "string" } }
        } } }
    }))
    .unwrap();

    let result = discover(&adapter, &Overrides::default());
    let pet = result.entity("Pet").expect("Pet discovered");
    assert_eq!(pet.filter_capabilities.filter_style, Some(FilterStyle::RestSimple));
    assert_eq!(
        pet.filter_capabilities.filter_params,
        Some(vec!["filter".to_string()])
    );
    assert_eq!(pet.filter_capabilities.filter_arg_name, None);
    assert!(synthesize_translator(pet).is_some());
}
