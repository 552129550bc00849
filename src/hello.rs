//! Demo API served by `docroute serve`.
//!
//! ```text
//! $ curl -d name=kk http://127.0.0.1:5000/resource/action
//! {"hello":"kk"}
//! ```

use crate::api::Api;
use crate::error::SchemaError;
use crate::handler::typed;
use serde::Deserialize;
use serde_json::json;

pub const API_DOC: &str = r#"
Demo API

`GET` any URL to read its documentation, `POST` to call it.

@message:
    hello?str: Greeting
"#;

pub const ACTION_DOC: &str = r#"
Say hello

Greets `name`, or the world when no name is given.

$input:
    name?str&default="world": Your name
$output: @message
"#;

pub const SUM_DOC: &str = r#"
Add numbers

$input:
    numbers: ["&minlen=1", "int"]
$output:
    total?int: Sum of the numbers
"#;

#[derive(Deserialize)]
struct Greet {
    name: String,
}

#[derive(Deserialize)]
struct Numbers {
    numbers: Vec<i64>,
}

/// Build the demo API.
pub fn hello_api() -> Result<Api, SchemaError> {
    let mut api = Api::builder().doc(API_DOC).build()?;
    api.res("resource").action(
        "action",
        ACTION_DOC,
        typed(|args: Greet| Ok(json!({ "hello": args.name }))),
    )?;
    api.res("math").action(
        "sum",
        SUM_DOC,
        typed(|args: Numbers| Ok(json!({ "total": args.numbers.iter().sum::<i64>() }))),
    )?;
    Ok(api)
}
