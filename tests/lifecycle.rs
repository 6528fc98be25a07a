//! Instance lifecycle: batched state updates, hook ordering, ref
//! lifecycle and render-error containment.

use std::cell::{Cell, RefCell};

use inkui::prelude::*;

fn init_logging() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn mount(def: ComponentDef, props: PropMap) -> (App, Document) {
    init_logging();
    let document = Document::new();
    let host = document.create_element("div");
    let app = App::mount(def, props, &host).expect("mount");
    (app, document)
}

thread_local! {
    static SCOPE: RefCell<Option<Scope>> = const { RefCell::new(None) };
    static RENDERS: Cell<usize> = const { Cell::new(0) };
    static UPDATES: Cell<usize> = const { Cell::new(0) };
    static DESTROYS: Cell<usize> = const { Cell::new(0) };
}

fn reset_counters() {
    SCOPE.with(|s| *s.borrow_mut() = None);
    RENDERS.with(|c| c.set(0));
    UPDATES.with(|c| c.set(0));
    DESTROYS.with(|c| c.set(0));
}

#[derive(Debug, Default)]
struct Tracked;

impl Component for Tracked {
    fn render(&self, cx: &Scope) -> Result<VNode, RenderError> {
        RENDERS.with(|c| c.set(c.get() + 1));
        Ok(html(
            "<p>{} {}</p>",
            vec![cx.state("count"), cx.state("label")],
        )?)
    }

    fn mounted(&self, cx: &Scope) -> Result<(), HookError> {
        SCOPE.with(|s| *s.borrow_mut() = Some(cx.clone()));
        Ok(())
    }

    fn updated(&self, _cx: &Scope, _prev_props: &PropMap) -> Result<(), HookError> {
        UPDATES.with(|c| c.set(c.get() + 1));
        Ok(())
    }

    fn before_destroy(&self, _cx: &Scope) -> Result<(), HookError> {
        DESTROYS.with(|c| c.set(c.get() + 1));
        Ok(())
    }
}

fn tracked_def() -> ComponentDef {
    ComponentDef::new("Tracked", || Box::new(Tracked))
}

#[test]
fn test_batched_set_state_renders_once_with_merged_state() {
    reset_counters();
    let (app, _document) = mount(tracked_def(), PropMap::new());
    assert_eq!(RENDERS.with(Cell::get), 1);

    let scope = SCOPE.with(|s| s.borrow().clone()).expect("mounted");
    app.batch(|| {
        scope.set_state(props! { "count" => 1 });
        scope.set_state(props! { "count" => 2 });
        scope.set_state(props! { "label" => "done" });
    });

    assert_eq!(RENDERS.with(Cell::get), 2);
    assert_eq!(UPDATES.with(Cell::get), 1);
    assert_eq!(scope.state("count"), Value::Int(2));
    let text = app
        .root_node()
        .first_child()
        .and_then(|t| t.text())
        .unwrap_or_default();
    assert_eq!(text, "2");
}

#[test]
fn test_unbatched_set_state_flushes_synchronously() {
    reset_counters();
    let (_app, _document) = mount(tracked_def(), PropMap::new());
    let scope = SCOPE.with(|s| s.borrow().clone()).expect("mounted");

    scope.set_state(props! { "count" => 7 });
    assert_eq!(RENDERS.with(Cell::get), 2);
    scope.set_state(props! { "count" => 8 });
    assert_eq!(RENDERS.with(Cell::get), 3);
}

#[test]
fn test_updated_receives_previous_props() {
    thread_local! {
        static PREV: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
    }

    #[derive(Debug, Default)]
    struct Labeled;

    impl Component for Labeled {
        fn render(&self, cx: &Scope) -> Result<VNode, RenderError> {
            Ok(html("<p>{}</p>", vec![cx.prop("label")])?)
        }

        fn updated(&self, _cx: &Scope, prev_props: &PropMap) -> Result<(), HookError> {
            PREV.with(|p| {
                p.borrow_mut()
                    .push(prev_props.get_or_null("label").to_text().unwrap_or_default());
            });
            Ok(())
        }
    }

    let (app, _document) = mount(
        ComponentDef::new("Labeled", || Box::new(Labeled)),
        props! { "label" => "one" },
    );
    app.update(props! { "label" => "two" });
    app.update(props! { "label" => "three" });
    PREV.with(|p| assert_eq!(*p.borrow(), vec!["one", "two"]));
}

#[derive(Debug, Default)]
struct Holder;

impl Component for Holder {
    fn render(&self, cx: &Scope) -> Result<VNode, RenderError> {
        if cx.prop("show").truthy() {
            Ok(html(
                "<div><{}></$></div>",
                vec![tracked_def().into()],
            )?)
        } else {
            Ok(html("<div></div>", vec![])?)
        }
    }
}

#[test]
fn test_pending_update_of_destroyed_instance_is_dropped() {
    reset_counters();
    let (app, _document) = mount(
        ComponentDef::new("Holder", || Box::new(Holder)),
        props! { "show" => true },
    );
    let scope = SCOPE.with(|s| s.borrow().clone()).expect("mounted");
    assert_eq!(RENDERS.with(Cell::get), 1);

    app.batch(|| {
        scope.set_state(props! { "count" => 1 });
        // Removing the child inside the same batch supersedes its queued
        // render.
        app.update(props! { "show" => false });
    });

    assert_eq!(RENDERS.with(Cell::get), 1);
    assert_eq!(DESTROYS.with(Cell::get), 1);
    assert!(scope.is_destroyed());
    assert_eq!(app.root_node().child_count(), 0);
}

#[test]
fn test_set_state_after_destroy_is_ignored() {
    reset_counters();
    let (app, _document) = mount(
        ComponentDef::new("Holder", || Box::new(Holder)),
        props! { "show" => true },
    );
    let scope = SCOPE.with(|s| s.borrow().clone()).expect("mounted");
    app.update(props! { "show" => false });
    assert_eq!(DESTROYS.with(Cell::get), 1);

    scope.set_state(props! { "count" => 5 });
    assert_eq!(RENDERS.with(Cell::get), 1);
}

#[test]
fn test_ref_callback_fires_once_per_attach_and_release() {
    thread_local! {
        static REF_EVENTS: RefCell<Vec<bool>> = const { RefCell::new(Vec::new()) };
    }

    #[derive(Debug, Default)]
    struct WithRef;

    impl Component for WithRef {
        fn initial_state(&self, _props: &PropMap) -> PropMap {
            // Created once, so re-renders see the same callback identity
            // and never re-bind.
            props! {
                "cb" => Value::ref_callback(|node| {
                    REF_EVENTS.with(|e| e.borrow_mut().push(node.is_some()));
                    Ok(())
                }),
            }
        }

        fn render(&self, cx: &Scope) -> Result<VNode, RenderError> {
            Ok(html(
                "<div ref={} data-gen={}></div>",
                vec![cx.state("cb"), cx.state("gen")],
            )?)
        }

        fn mounted(&self, cx: &Scope) -> Result<(), HookError> {
            SCOPE.with(|s| *s.borrow_mut() = Some(cx.clone()));
            Ok(())
        }
    }

    reset_counters();
    let (app, _document) = mount(ComponentDef::new("WithRef", || Box::new(WithRef)), PropMap::new());
    assert_eq!(REF_EVENTS.with(|e| e.borrow().clone()), vec![true]);

    let scope = SCOPE.with(|s| s.borrow().clone()).expect("mounted");
    scope.set_state(props! { "gen" => 2 });
    assert_eq!(REF_EVENTS.with(|e| e.borrow().clone()), vec![true]);

    app.unmount();
    assert_eq!(REF_EVENTS.with(|e| e.borrow().clone()), vec![true, false]);
}

#[derive(Debug, Default)]
struct Flaky;

impl Component for Flaky {
    fn render(&self, cx: &Scope) -> Result<VNode, RenderError> {
        if cx.state("fail").truthy() {
            return Err(RenderError::msg("simulated failure"));
        }
        Ok(html("<p>{}</p>", vec![cx.prop("text")])?)
    }

    fn mounted(&self, cx: &Scope) -> Result<(), HookError> {
        SCOPE.with(|s| *s.borrow_mut() = Some(cx.clone()));
        Ok(())
    }
}

#[test]
fn test_failed_rerender_keeps_previous_tree() {
    reset_counters();
    let (app, document) = mount(
        ComponentDef::new("Flaky", || Box::new(Flaky)),
        props! { "text" => "ok" },
    );
    let scope = SCOPE.with(|s| s.borrow().clone()).expect("mounted");

    document.enable_mutation_log();
    scope.set_state(props! { "fail" => true });
    assert_eq!(document.take_mutations(), vec![]);
    let text = app
        .root_node()
        .first_child()
        .and_then(|t| t.text())
        .unwrap_or_default();
    assert_eq!(text, "ok");

    // Recovery patches from the preserved commit.
    app.batch(|| {
        scope.set_state(props! { "fail" => false });
    });
    app.update(props! { "text" => "recovered" });
    let text = app
        .root_node()
        .first_child()
        .and_then(|t| t.text())
        .unwrap_or_default();
    assert_eq!(text, "recovered");
}

#[test]
fn test_root_mount_error_propagates() {
    let document = Document::new();
    let host = document.create_element("div");

    #[derive(Debug, Default)]
    struct Broken;

    impl Component for Broken {
        fn render(&self, _cx: &Scope) -> Result<VNode, RenderError> {
            Err(RenderError::msg("cannot render"))
        }
    }

    let result = App::mount(
        ComponentDef::new("Broken", || Box::new(Broken)),
        PropMap::new(),
        &host,
    );
    assert!(result.is_err());
    assert_eq!(host.child_count(), 0);
}

#[test]
fn test_nested_mount_error_is_contained() {
    #[derive(Debug, Default)]
    struct Broken;

    impl Component for Broken {
        fn render(&self, _cx: &Scope) -> Result<VNode, RenderError> {
            Err(RenderError::msg("cannot render"))
        }
    }

    #[derive(Debug, Default)]
    struct Parent;

    impl Component for Parent {
        fn render(&self, _cx: &Scope) -> Result<VNode, RenderError> {
            Ok(html(
                "<div class=\"parent\"><{}></$></div>",
                vec![ComponentDef::new("Broken", || Box::new(Broken)).into()],
            )?)
        }
    }

    let (app, _document) = mount(ComponentDef::new("Parent", || Box::new(Parent)), PropMap::new());
    let root = app.root_node();
    assert_eq!(root.attribute("class").as_deref(), Some("parent"));
    // The broken child commits an empty placeholder instead of poisoning
    // the parent.
    assert_eq!(root.child_count(), 1);
    let placeholder = root.first_child().expect("placeholder");
    assert_eq!(placeholder.text().as_deref(), Some(""));
}
