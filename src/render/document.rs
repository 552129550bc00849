use super::markdown::{dumps, markdown};
use crate::api::{ResourceTable, RouteEntry};
use crate::doc::{get_title, DocMap};
use minijinja::{context, Environment, Value as TemplateValue};
use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::{json, Value};

const TEMPLATE_NAME: &str = "document.html";

#[allow(clippy::expect_used)]
static TEMPLATES: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    env.add_template(TEMPLATE_NAME, include_str!("../../templates/document.html"))
        .expect("embedded document template");
    env
});

/// Content of a documentation page, either the API index or one route.
#[derive(Debug, Clone, Copy)]
pub enum DocPage<'a> {
    Root {
        desc: &'a str,
        shared: &'a DocMap,
        resources: &'a ResourceTable,
    },
    Route {
        desc: &'a str,
        directives: &'a DocMap,
    },
}

#[derive(Serialize)]
struct NamedJson<'a> {
    name: &'a str,
    json: String,
}

#[derive(Serialize)]
struct ResourceSection<'a> {
    name: &'a str,
    routes: &'a [RouteEntry],
}

fn named_json(map: &DocMap) -> Vec<NamedJson<'_>> {
    map.iter()
        .map(|(name, value)| NamedJson {
            name,
            json: dumps(value),
        })
        .collect()
}

impl DocPage<'_> {
    fn desc(&self) -> &str {
        match self {
            DocPage::Root { desc, .. } | DocPage::Route { desc, .. } => desc,
        }
    }

    /// `{desc, shared, resources}` for the index, `{desc, directives}` for a route.
    pub fn to_json(&self) -> Value {
        match self {
            DocPage::Root {
                desc,
                shared,
                resources,
            } => json!({"desc": desc, "shared": shared, "resources": resources}),
            DocPage::Route { desc, directives } => json!({"desc": desc, "directives": directives}),
        }
    }

    /// Render the page as a standalone HTML document.
    ///
    /// # Errors
    ///
    /// Template evaluation failures from `minijinja`.
    pub fn render_html(&self) -> Result<String, minijinja::Error> {
        let (shared, directives, resources) = match self {
            DocPage::Root {
                shared, resources, ..
            } => {
                let sections: Vec<ResourceSection<'_>> = resources
                    .iter()
                    .map(|(name, routes)| ResourceSection { name, routes })
                    .collect();
                (named_json(shared), Vec::new(), sections)
            }
            DocPage::Route { directives, .. } => (Vec::new(), named_json(directives), Vec::new()),
        };
        let title = match get_title(self.desc()) {
            t if t.is_empty() => "API".to_string(),
            t => t,
        };
        TEMPLATES.get_template(TEMPLATE_NAME)?.render(context! {
            title => title,
            desc => TemplateValue::from_safe_string(markdown(self.desc())),
            shared => shared,
            directives => directives,
            resources => resources,
        })
    }
}
