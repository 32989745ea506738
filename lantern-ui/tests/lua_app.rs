/// Integration tests for the Lua front-end: scripts build trees with
/// lantern.h, bind them through lantern.state and drive updates.

use lantern_ui::app::App;
use lantern_ui::document::{Document, VirtualDocument};
use lantern_ui::node::NodeId;
use lantern_ui::state::{State, StatePatch};
use tracing_subscriber::EnvFilter;

fn app(state: State) -> (VirtualDocument, App<VirtualDocument>) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    let doc = VirtualDocument::new();
    let app = App::new(doc.clone(), state).unwrap();
    (doc, app)
}

#[test]
fn test_state_text_from_lua() {
    let (doc, app) = app(State::from_iter([("firstName", "Manuja")]));

    let refreshed: usize = app
        .lua()
        .load(
            r#"
            local h = lantern.h
            lantern.mount(h("p", nil, "Hello ", lantern.state.firstName))
            lantern.mount(h("footer", nil, "static"))
            local ids = lantern.set_state({ firstName = "Jyoti" })
            return #ids
            "#,
        )
        .eval()
        .unwrap();

    assert_eq!(refreshed, 1);
    assert_eq!(doc.text_content(doc.root()), "Hello Jyotistatic");
}

#[test]
fn test_unknown_key_from_lua() {
    let (_, app) = app(State::new());

    let (ok, message): (bool, String) = app
        .lua()
        .load(
            r#"
            local ok, err = pcall(lantern.set_state, { unknownKey = 1 })
            return ok, tostring(err)
            "#,
        )
        .eval()
        .unwrap();

    assert!(!ok);
    assert!(message.contains("unknownKey is not defined in state."));
    assert!(app.component().borrow().state().is_empty());
}

#[test]
fn test_state_proxy() {
    let (_, app) = app(State::from_iter([("muted", true)]));

    let (key, value, missing): (String, bool, bool) = app
        .lua()
        .load(
            r#"
            local ref = lantern.state.muted
            local ok = pcall(function() return lantern.state.volume end)
            return ref.key, ref.value, ok
            "#,
        )
        .eval()
        .unwrap();

    assert_eq!(key, "muted");
    assert!(value);
    assert!(!missing);
}

#[test]
fn test_lua_component_forwards_children() {
    let (doc, app) = app(State::from_iter([("firstName", "Manuja")]));

    app.run_script(
        r#"
        local h = lantern.h

        local function Card(props)
            return h("article", { class = "card" },
                h("h2", nil, props.title),
                props.children)
        end

        lantern.mount(h(Card, { title = "Title" }, "body ", nil, lantern.state.firstName))
        "#,
    )
    .unwrap();

    assert_eq!(doc.text_content(doc.root()), "Titlebody Manuja");
    assert_eq!(app.component().borrow().dependents("firstName").len(), 1);

    app.set_state(StatePatch::new().set("firstName", "Jyoti")).unwrap();
    assert_eq!(doc.text_content(doc.root()), "Titlebody Jyoti");
}

#[test]
fn test_lua_listener_updates_state() {
    let (doc, app) = app(State::new());

    let id: String = app
        .lua()
        .load(
            r#"
            local h = lantern.h
            lantern.init({ count = 0 })
            local function increment()
                lantern.set_state({ count = lantern.state.count.value + 1 })
            end
            return lantern.mount(h("button", { onclick = increment }, lantern.state.count))
            "#,
        )
        .eval()
        .unwrap();

    let id: NodeId = id.parse().unwrap();
    let button = app.component().borrow().element(id).unwrap();

    assert_eq!(doc.dispatch(button, "click"), 1);
    assert_eq!(doc.dispatch(button, "click"), 1);
    assert_eq!(doc.text_content(button), "2");
}

#[test]
fn test_failing_listener_is_contained() {
    let (doc, app) = app(State::new());

    let id: String = app
        .lua()
        .load(
            r#"
            return lantern.mount(lantern.h("button", { onclick = function() error("boom") end }))
            "#,
        )
        .eval()
        .unwrap();

    let button = app.component().borrow().element(id.parse().unwrap()).unwrap();
    assert_eq!(doc.dispatch(button, "click"), 1);
}

#[test]
fn test_node_cannot_be_mounted_twice() {
    let (_, app) = app(State::new());

    let (ok, consumed): (bool, bool) = app
        .lua()
        .load(
            r#"
            local node = lantern.h("p", nil, "once")
            lantern.mount(node)
            local ok = pcall(lantern.mount, node)
            return ok, node.consumed
            "#,
        )
        .eval()
        .unwrap();

    assert!(!ok);
    assert!(consumed);
    assert_eq!(app.component().borrow().mounted_count(), 2);
}

#[test]
fn test_reset_from_lua() {
    let (doc, app) = app(State::from_iter([("label", "hi")]));

    app.run_script(
        r#"
        local h = lantern.h
        lantern.mount(h("div", nil, h("p", nil, h("em", { title = lantern.state.label }))))
        lantern.reset()
        "#,
    )
    .unwrap();

    assert_eq!(doc.connected_count(), 0);
    let component = app.component().borrow();
    assert_eq!(component.mounted_count(), 0);
    assert!(component.state().is_empty());
}

#[test]
fn test_table_state_values_round_trip() {
    let (_, app) = app(State::new());

    let name: String = app
        .lua()
        .load(
            r#"
            lantern.init({ user = { name = "Manuja" } })
            return lantern.state.user.value.name
            "#,
        )
        .eval()
        .unwrap();

    assert_eq!(name, "Manuja");
}

#[test]
fn test_h_rejects_bad_arguments() {
    let (_, app) = app(State::new());

    let (bad_type, bad_tag, bad_child): (bool, bool, bool) = app
        .lua()
        .load(
            r#"
            local h = lantern.h
            local a = pcall(h, 42)
            local b = pcall(h, "not a tag")
            local c = pcall(h, "p", nil, print)
            return a, b, c
            "#,
        )
        .eval()
        .unwrap();

    assert!(!bad_type);
    assert!(!bad_tag);
    assert!(!bad_child);
}
