//! End-to-end widget behavior: popup positioning and hiding, dropdown
//! visibility rules and the heading menu's command reporting.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use inkui::prelude::*;
use inkui::widgets::{DropdownToolbarButton, HeadingMenu, Popup, cls};

fn init_logging() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn toolbar_host(width: i64) -> (Document, Node) {
    init_logging();
    let document = Document::new();
    let host = document.create_element("div");
    host.set_attribute("class", cls("toolbar"));
    host.set_offsets(0, 0, width, 30);
    (document, host)
}

fn popup_props(show: bool, hide: &Value) -> PropMap {
    props! {
        "show" => show,
        "info" => props! {
            "class_name" => "headings",
            "pos" => props! { "left" => 500, "top" => 10 },
        },
        "hide_popup" => hide.clone(),
        "body" => Value::Null,
    }
}

#[test]
fn test_popup_clamps_left_to_toolbar_width() {
    let (_document, host) = toolbar_host(400);
    let hide = Value::handler(|_| {});

    let app = App::mount(Popup::def(), popup_props(false, &hide), &host).expect("mount");
    let popup = app.root_node();
    assert_eq!(popup.style("display").as_deref(), Some("none"));
    popup.set_offsets(0, 0, 110, 60);

    app.update(popup_props(true, &hide));
    let popup = app.root_node();
    assert_eq!(popup.style("display").as_deref(), Some("block"));
    // left + width (500 + 110) overflows the 400px toolbar, so the popup
    // commits left = 400 - 110 - 20.
    assert_eq!(popup.style("left").as_deref(), Some("270px"));
    assert_eq!(popup.style("top").as_deref(), Some("10px"));
}

#[test]
fn test_popup_keeps_position_that_fits() {
    let (_document, host) = toolbar_host(1000);
    let hide = Value::handler(|_| {});

    let app = App::mount(Popup::def(), popup_props(false, &hide), &host).expect("mount");
    app.root_node().set_offsets(0, 0, 110, 60);

    app.update(popup_props(true, &hide));
    assert_eq!(app.root_node().style("left").as_deref(), Some("500px"));
}

#[test]
fn test_popup_hides_on_outside_mousedown_and_escape() {
    let (_document, host) = toolbar_host(400);
    let hides = Rc::new(Cell::new(0));
    let counter = hides.clone();
    let hide = Value::handler(move |_| counter.set(counter.get() + 1));

    let app = App::mount(Popup::def(), popup_props(true, &hide), &host).expect("mount");

    // Mousedown inside the popup does not hide it.
    let inside = app.root_node().first_child().expect("popup body");
    app.dispatch_document(&Event::new("mousedown").with_target(inside));
    assert_eq!(hides.get(), 0);

    app.dispatch_document(&Event::new("mousedown").with_target(host.clone()));
    assert_eq!(hides.get(), 1);

    app.dispatch_document(&Event::new("keydown").with_key("Escape"));
    assert_eq!(hides.get(), 2);

    // Hidden popups ignore Escape.
    app.update(popup_props(false, &hide));
    app.dispatch_document(&Event::new("keydown").with_key("Escape"));
    assert_eq!(hides.get(), 2);
}

#[test]
fn test_popup_ignores_mousedown_on_opener_element() {
    let (document, host) = toolbar_host(400);
    let opener = document.create_element("button");
    opener.set_attribute("class", "heading-opener");
    host.append_child(&opener);

    let hides = Rc::new(Cell::new(0));
    let counter = hides.clone();
    let hide = Value::handler(move |_| counter.set(counter.get() + 1));

    let props = props! {
        "show" => true,
        "info" => props! {
            "class_name" => "headings",
            "pos" => props! { "left" => 0, "top" => 10 },
            "from_el" => "heading-opener",
        },
        "hide_popup" => hide,
        "body" => Value::Null,
    };
    let app = App::mount(Popup::def(), props, &host).expect("mount");

    // The click that opened the popup lands on the opener; it must not
    // immediately hide what it just showed.
    app.dispatch_document(&Event::new("mousedown").with_target(opener.clone()));
    assert_eq!(hides.get(), 0);

    app.dispatch_document(&Event::new("mousedown").with_target(host.clone()));
    assert_eq!(hides.get(), 1);
}

#[test]
fn test_popup_listeners_removed_on_unmount() {
    let (document, host) = toolbar_host(400);
    let hide = Value::handler(|_| {});
    let app = App::mount(Popup::def(), popup_props(true, &hide), &host).expect("mount");
    assert_eq!(document.listener_count("mousedown"), 1);
    assert_eq!(document.listener_count("keydown"), 1);

    app.unmount();
    assert_eq!(document.listener_count("mousedown"), 0);
    assert_eq!(document.listener_count("keydown"), 0);
    assert_eq!(host.child_count(), 0);
}

fn dropdown_props(groups: Vec<Value>) -> PropMap {
    props! {
        "disabled" => false,
        "item" => props! {
            "class_name" => "more",
            "tooltip" => "More",
            "aria_has_popup" => true,
        },
        "items" => groups,
        "exec_command" => Value::handler(|_| {}),
    }
}

fn group(command: &str, hidden: bool) -> Value {
    props! {
        "hidden" => hidden,
        "items" => vec![Value::from(props! {
            "command" => command,
            "class_name" => command,
            "tooltip" => command,
        })],
    }
    .into()
}

#[test]
fn test_dropdown_renders_visible_groups_with_last_divider_hidden() {
    let (_document, host) = toolbar_host(600);
    let groups = vec![
        group("bold", false),
        group("italic", false),
        group("strike", false),
        group("quote", false),
        group("code", false),
        group("table", true),
    ];
    let app = App::mount(DropdownToolbarButton::def(), dropdown_props(groups), &host)
        .expect("mount");

    let root = app.root_node();
    let children = root.children();
    assert_eq!(children.len(), 2);
    let dropdown = &children[1];
    assert!(inkui::widgets::has_class(dropdown, &cls("dropdown-toolbar")));
    // Closed by default.
    assert_eq!(dropdown.style("display").as_deref(), Some("none"));

    // The hidden sixth group is not rendered at all.
    let rendered = dropdown.children();
    assert_eq!(rendered.len(), 5);

    // Only the last visible group omits its divider.
    for (index, group_el) in rendered.iter().enumerate() {
        let has_divider = group_el
            .children()
            .iter()
            .any(|child| inkui::widgets::has_class(child, &cls("divider")));
        assert_eq!(has_divider, index < 4, "group {index}");
    }
}

#[test]
fn test_dropdown_opens_positions_and_closes_on_escape() {
    let (_document, host) = toolbar_host(600);
    let app = App::mount(
        DropdownToolbarButton::def(),
        dropdown_props(vec![group("bold", false)]),
        &host,
    )
    .expect("mount");

    let button = app.root_node().first_child().expect("opener");
    button.set_offsets(550, 2, 30, 24);

    app.dispatch(&button, &Event::new("click"));
    let dropdown = app.root_node().children().remove(1);
    assert_eq!(dropdown.style("display"), None);
    assert_eq!(dropdown.style("top").as_deref(), Some("30px"));
    assert_eq!(dropdown.style("right").as_deref(), Some("10px"));
    assert_eq!(
        button.attribute("aria-expanded").as_deref(),
        Some("true")
    );

    app.dispatch_document(&Event::new("keydown").with_key("Escape"));
    let dropdown = app.root_node().children().remove(1);
    assert_eq!(dropdown.style("display").as_deref(), Some("none"));
    assert_eq!(button.attribute("aria-expanded"), None);
}

#[test]
fn test_dropdown_closes_on_outside_click_but_not_inside() {
    let (_document, host) = toolbar_host(600);
    let app = App::mount(
        DropdownToolbarButton::def(),
        dropdown_props(vec![group("bold", false)]),
        &host,
    )
    .expect("mount");

    let button = app.root_node().first_child().expect("opener");
    app.dispatch(&button, &Event::new("click"));
    let dropdown = app.root_node().children().remove(1);
    assert_eq!(dropdown.style("display"), None);

    // Clicks inside the dropdown (or on the opener) keep it open. The
    // document listener also sees the opening click; the opener carries
    // the `more` class, so it does not count as outside.
    app.dispatch_document(&Event::new("click").with_target(dropdown.clone()));
    assert_eq!(
        app.root_node().children().remove(1).style("display"),
        None
    );

    app.dispatch_document(&Event::new("click").with_target(host.clone()));
    assert_eq!(
        app.root_node()
            .children()
            .remove(1)
            .style("display")
            .as_deref(),
        Some("none")
    );
}

#[test]
fn test_heading_menu_reports_levels_through_exec_command() {
    let document = Document::new();
    let host = document.create_element("div");
    let commands: Rc<RefCell<Vec<(String, Option<i64>)>>> = Rc::new(RefCell::new(Vec::new()));
    let log = commands.clone();
    let exec = Value::handler(move |ev| {
        if let Some(data) = ev.data().as_map() {
            log.borrow_mut().push((
                data.get_or_null("name").to_text().unwrap_or_default(),
                data.get_or_null("level").as_int(),
            ));
        }
    });

    let app = App::mount(
        HeadingMenu::def(),
        props! { "exec_command" => exec },
        &host,
    )
    .expect("mount");

    let menu = app.root_node();
    assert_eq!(menu.tag(), Some("ul"));
    assert_eq!(menu.attribute("role").as_deref(), Some("menu"));
    let entries = menu.children();
    assert_eq!(entries.len(), 7);

    // h1..h6 via dynamic tags, then the paragraph entry.
    for (index, li) in entries.iter().take(6).enumerate() {
        let heading = li.first_child().expect("heading wrapper");
        assert_eq!(heading.tag().map(str::to_owned), Some(format!("h{}", index + 1)));
    }
    let paragraph = entries[6].first_child().expect("paragraph wrapper");
    assert_eq!(paragraph.tag(), Some("div"));

    let h3_button = entries[2]
        .first_child()
        .and_then(|h| h.first_child())
        .expect("heading button");
    app.dispatch(&h3_button, &Event::new("click"));
    let paragraph_button = paragraph.first_child().expect("paragraph button");
    app.dispatch(&paragraph_button, &Event::new("click"));

    assert_eq!(
        *commands.borrow(),
        vec![("heading".to_owned(), Some(3)), ("heading".to_owned(), None)]
    );
}
