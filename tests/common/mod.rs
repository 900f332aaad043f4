#![allow(dead_code)]

pub mod temp_files {
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Write `content` to a temporary file with the given extension.
    ///
    /// The file is removed when the returned handle is dropped.
    pub fn create_temp_spec(content: &str, ext: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .prefix("oasguard_test_")
            .suffix(&format!(".{ext}"))
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    pub fn create_temp_yaml(content: &str) -> NamedTempFile {
        create_temp_spec(content, "yaml")
    }

    pub fn create_temp_json(content: &str) -> NamedTempFile {
        create_temp_spec(content, "json")
    }
}

pub mod fixtures {
    use oasguard::spec::{load_spec_from_str, SpecFormat};
    use oasguard::{ApiSpec, RequestValidator, ValidatorOptions};

    /// Items API used across the interceptor tests.
    pub const ITEMS_SPEC: &str = r##"
openapi: 3.0.0
info:
  title: Items API
  version: "1.0.0"
components:
  schemas:
    NewItem:
      type: object
      required: [name]
      properties:
        name: { type: string }
        tags:
          type: array
          items: { type: string }
    ItemId:
      type: string
      pattern: "^[0-9]+$"
  parameters:
    Limit:
      in: query
      name: limit
      schema: { type: string, pattern: "^[0-9]+$" }
paths:
  /items:
    get:
      parameters:
        - $ref: "#/components/parameters/Limit"
        - in: query
          name: sort
          schema: { type: string, enum: [asc, desc] }
        - in: query
          name: tags
          schema:
            type: array
            items: { type: string }
    post:
      requestBody:
        required: true
        content:
          application/json:
            schema:
              $ref: "#/components/schemas/NewItem"
  /items/{id}:
    get:
      parameters:
        - in: path
          name: id
          required: true
          schema:
            $ref: "#/components/schemas/ItemId"
    delete:
      parameters:
        - in: path
          name: id
          required: true
          schema: { type: string }
  /a/{x}:
    get:
      parameters:
        - in: path
          name: x
          required: true
          schema: { type: string, pattern: "^[0-9]+$" }
  /a/fixed:
    get: {}
  /files/{name}.json:
    get:
      parameters:
        - in: path
          name: name
          required: true
          schema: { type: string, minLength: 3 }
"##;

    pub fn items_spec() -> ApiSpec {
        load_spec_from_str(ITEMS_SPEC, SpecFormat::Yaml).unwrap()
    }

    pub fn validator(options: ValidatorOptions) -> RequestValidator {
        RequestValidator::new(Some(items_spec()), options).unwrap()
    }
}
