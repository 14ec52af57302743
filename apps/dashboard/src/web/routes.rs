//! # Route Table
//!
//! Every page route with its access class. Read routes are always mounted;
//! mutating routes only when the dashboard is not read-only. The table is
//! filtered once, when the router is built.

use super::AppState;
use super::handlers;
use axum::{
    Router,
    routing::{MethodRouter, any, get, post},
};

/// Whether a route only reads or can change tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Mutate,
}

/// One entry of the route table.
#[derive(Debug, Clone, Copy)]
pub struct RouteSpec {
    pub name: &'static str,
    pub path: &'static str,
    pub access: Access,
    pub methods: fn() -> MethodRouter<AppState>,
}

fn index() -> MethodRouter<AppState> {
    get(handlers::index_handler)
}

fn task() -> MethodRouter<AppState> {
    get(handlers::task_handler)
}

fn result() -> MethodRouter<AppState> {
    get(handlers::result_handler)
}

fn download() -> MethodRouter<AppState> {
    get(handlers::download_handler)
}

fn new_task() -> MethodRouter<AppState> {
    get(handlers::new_form_handler).post(handlers::create_handler)
}

fn delete_task() -> MethodRouter<AppState> {
    get(handlers::delete_confirm_handler).post(handlers::delete_handler)
}

fn run_task() -> MethodRouter<AppState> {
    get(handlers::run_handler)
}

fn edit_task() -> MethodRouter<AppState> {
    get(handlers::edit_form_handler).post(handlers::edit_handler)
}

fn ignore_rule() -> MethodRouter<AppState> {
    post(handlers::ignore_handler)
}

fn unignore_rule() -> MethodRouter<AppState> {
    post(handlers::unignore_handler)
}

/// Every route the dashboard knows.
pub const ROUTES: [RouteSpec; 10] = [
    RouteSpec {
        name: "index",
        path: "/",
        access: Access::Read,
        methods: index,
    },
    RouteSpec {
        name: "new",
        path: "/new",
        access: Access::Mutate,
        methods: new_task,
    },
    RouteSpec {
        name: "task",
        path: "/{task_id}",
        access: Access::Read,
        methods: task,
    },
    RouteSpec {
        name: "delete",
        path: "/{task_id}/delete",
        access: Access::Mutate,
        methods: delete_task,
    },
    RouteSpec {
        name: "run",
        path: "/{task_id}/run",
        access: Access::Mutate,
        methods: run_task,
    },
    RouteSpec {
        name: "edit",
        path: "/{task_id}/edit",
        access: Access::Mutate,
        methods: edit_task,
    },
    RouteSpec {
        name: "ignore",
        path: "/{task_id}/ignore",
        access: Access::Mutate,
        methods: ignore_rule,
    },
    RouteSpec {
        name: "unignore",
        path: "/{task_id}/unignore",
        access: Access::Mutate,
        methods: unignore_rule,
    },
    RouteSpec {
        name: "result",
        path: "/{task_id}/{result_id}",
        access: Access::Read,
        methods: result,
    },
    RouteSpec {
        name: "download",
        path: "/{task_id}/{result_id}/download/{format}",
        access: Access::Read,
        methods: download,
    },
];

/// Routes mounted for the given read-only flag.
pub fn mounted(readonly: bool) -> impl Iterator<Item = &'static RouteSpec> {
    ROUTES
        .iter()
        .filter(move |route| !readonly || route.access == Access::Read)
}

/// Routes reserved for the given read-only flag: the mutating paths, which
/// must answer 404 without consulting the webservice.
pub fn reserved(readonly: bool) -> impl Iterator<Item = &'static RouteSpec> {
    ROUTES
        .iter()
        .filter(move |route| readonly && route.access == Access::Mutate)
}

/// Register the mounted routes on `router`.
///
/// In read-only mode the mutating paths are still claimed, by the not-found
/// handler, so that `/new` or `/{task_id}/run` never fall through to
/// `/{task_id}` or `/{task_id}/{result_id}`.
pub fn mount(router: Router<AppState>, readonly: bool) -> Router<AppState> {
    let router = mounted(readonly).fold(router, |router, route| {
        tracing::debug!(route = route.name, path = route.path, "Mounting route");
        router.route(route.path, (route.methods)())
    });
    let router = reserved(readonly).fold(router, |router, route| {
        tracing::debug!(route = route.name, path = route.path, "Reserving route");
        router.route(route.path, any(handlers::not_found_handler))
    });
    if readonly {
        tracing::info!("Read-only mode: task changes are disabled");
    }
    router
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readonly_mounts_only_read_routes() {
        let names: Vec<&str> = mounted(true).map(|route| route.name).collect();
        assert_eq!(names, vec!["index", "task", "result", "download"]);
    }

    #[test]
    fn writable_mounts_everything() {
        assert_eq!(mounted(false).count(), ROUTES.len());
        assert_eq!(reserved(false).count(), 0);
    }

    #[test]
    fn readonly_reserves_every_mutating_path() {
        let paths: Vec<&str> = reserved(true).map(|route| route.path).collect();
        assert_eq!(
            paths,
            vec![
                "/new",
                "/{task_id}/delete",
                "/{task_id}/run",
                "/{task_id}/edit",
                "/{task_id}/ignore",
                "/{task_id}/unignore",
            ]
        );
    }
}
