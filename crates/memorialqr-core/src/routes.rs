//! Navigation targets of the admin panel.
//!
//! Route table:
//!
//! | path              | route                 | guarded |
//! |-------------------|-----------------------|---------|
//! | `` (empty)        | redirect to dashboard | yes     |
//! | `login`           | `Login`               | no      |
//! | `dashboard`       | `Dashboard`           | yes     |
//! | `persons`         | `Persons`             | yes     |
//! | `companies`       | `Companies`           | yes     |
//! | `person/{tcno}`   | `Person`              | no      |
//! | `company/{code}`  | `Company`             | no      |
//! | anything else     | redirect to dashboard | yes     |

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "route", rename_all = "lowercase")]
pub enum Route {
    Login,
    Dashboard,
    Persons,
    Companies,
    /// Public profile page of a person.
    Person { tcno: String },
    /// Public profile page of a company.
    Company { code: String },
}

impl Route {
    /// Resolve a path to a route, applying the table's redirects.
    pub fn parse(path: &str) -> Self {
        let path = path.trim().trim_matches('/');
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            ["login"] => Route::Login,
            ["dashboard"] => Route::Dashboard,
            ["persons"] => Route::Persons,
            ["companies"] => Route::Companies,
            ["person", tcno] => Route::Person {
                tcno: (*tcno).to_string(),
            },
            ["company", code] => Route::Company {
                code: (*code).to_string(),
            },
            _ => Route::Dashboard,
        }
    }

    /// Whether navigation here must pass the session guard.
    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Dashboard | Route::Persons | Route::Companies)
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Persons => "/persons".to_string(),
            Route::Companies => "/companies".to_string(),
            Route::Person { tcno } => format!("/person/{}", tcno),
            Route::Company { code } => format!("/company/{}", code),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl From<&str> for Route {
    fn from(path: &str) -> Self {
        Route::parse(path)
    }
}
