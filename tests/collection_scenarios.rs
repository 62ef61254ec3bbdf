// End-to-end collection scenarios driven through the kit widgets

use std::sync::{Arc, Mutex};
use std::time::Duration;

use orbit_headless::collection::{
    text_value, ActivationTrigger, CollectionEvent, Comparator, OptionId,
};
use orbit_headless::config::{EngineConfig, Services};
use orbit_headless::context::{Callback, ContextProvider};
use orbit_headless::dom::{Dom, MemoryDom, NodeId};
use orbit_headless::events::{Key, KeyboardEvent, PointerEvent};
use orbit_headless::kit::components::{
    Listbox, ListboxOption, ListboxOptionProps, ListboxProps, Menu, MenuItem, MenuItemProps,
    MenuProps,
};
use orbit_headless::outside::Verdict;

struct Page {
    dom: MemoryDom,
    button: NodeId,
    nodes: Vec<NodeId>,
    elsewhere: NodeId,
}

fn page(labels: &[&str]) -> (Page, NodeId) {
    let mut dom = MemoryDom::new();
    let body = dom.body();
    let button = dom.append_element(body, "button");
    let panel = dom.append_element(body, "ul");
    let nodes = labels
        .iter()
        .map(|label| {
            let node = dom.append_element(panel, "li");
            dom.append_text(node, label);
            node
        })
        .collect();
    let elsewhere = dom.append_element(body, "p");
    (
        Page {
            dom,
            button,
            nodes,
            elsewhere,
        },
        panel,
    )
}

fn fruit_listbox(
    services: &Services,
    page: &Page,
    panel: NodeId,
    on_change: Option<Callback<Vec<String>>>,
) -> (Listbox<String>, Vec<ListboxOption<String>>) {
    let ctx = ContextProvider::new();
    let listbox = Listbox::create(
        ListboxProps {
            button: Some(page.button),
            options: Some(panel),
            comparator: Some(Comparator::by_value()),
            on_change,
            ..Default::default()
        },
        services,
        &ctx,
    )
    .unwrap();
    let options = page
        .nodes
        .iter()
        .map(|&node| {
            let label = text_value(&page.dom, node).to_lowercase();
            let props = ListboxOptionProps {
                id: OptionId::new(&label),
                node,
                value: label.clone(),
                disabled: Some(label == "banana"),
                order: None,
            };
            ListboxOption::create(props, &ctx, &page.dom).unwrap()
        })
        .collect();
    (listbox, options)
}

#[test]
fn keyboard_session_with_typeahead_scroll_and_commit() {
    let services = Services::default();
    let (mut page, panel) = page(&["Apple", "Banana", "Blueberry", "Cherry"]);
    let changes = Arc::new(Mutex::new(Vec::new()));
    let sink = changes.clone();
    let (listbox, options) = fruit_listbox(
        &services,
        &page,
        panel,
        Some(Callback::new(move |value: Vec<String>| {
            sink.lock().unwrap().push(value)
        })),
    );

    let events = Arc::new(Mutex::new(Vec::new()));
    let log = events.clone();
    let _subscription = listbox
        .collection()
        .subscribe(move |event| log.lock().unwrap().push(event.clone()));

    // Open onto the first option; the activation asks for a scroll.
    let mut down = KeyboardEvent::new(Key::ArrowDown);
    assert!(listbox.on_button_key_down(&mut page.dom, &mut down));
    assert_eq!(listbox.collection().take_scroll_request(), None);
    services.scheduler.run_animation_frame();
    assert_eq!(
        listbox.collection().take_scroll_request(),
        Some(page.nodes[0])
    );

    // "b" skips the disabled Banana.
    let mut b = KeyboardEvent::new(Key::Character('b'));
    listbox.on_options_key_down(&mut page.dom, &mut b);
    assert!(options[2].is_active());
    assert_eq!(listbox.collection().search_query(), "b");

    // The buffer clears after the inactivity window.
    services.scheduler.advance(Duration::from_millis(349));
    assert_eq!(listbox.collection().search_query(), "b");
    services.scheduler.advance(Duration::from_millis(1));
    assert_eq!(listbox.collection().search_query(), "");

    // Hovering activates without a scroll request.
    services.scheduler.run_animation_frame();
    listbox.collection().take_scroll_request();
    options[3].on_pointer_move(&page.dom);
    services.scheduler.run_animation_frame();
    assert_eq!(listbox.collection().take_scroll_request(), None);
    assert_eq!(
        listbox.collection().with_state(|s| s.activation_trigger()),
        ActivationTrigger::Pointer
    );

    let mut enter = KeyboardEvent::new(Key::Enter);
    listbox.on_options_key_down(&mut page.dom, &mut enter);
    assert_eq!(listbox.value(), vec!["cherry".to_string()]);
    assert!(!listbox.is_open());
    assert_eq!(page.dom.active_element(), Some(page.button));
    assert_eq!(*changes.lock().unwrap(), vec![vec!["cherry".to_string()]]);

    let events = events.lock().unwrap();
    assert_eq!(events.first(), Some(&CollectionEvent::Opened));
    let closed = events.iter().position(|e| *e == CollectionEvent::Closed);
    let changed = events.iter().position(|e| *e == CollectionEvent::ValueChanged);
    assert!(closed.is_some() && closed < changed);
    assert_eq!(events.last(), Some(&CollectionEvent::ValueChanged));

    for option in options {
        option.unmount(&page.dom);
    }
    assert_eq!(listbox.teardown(), 0);
}

#[test]
fn reopening_activates_the_selected_value() {
    let services = Services::default();
    let (mut page, panel) = page(&["Apple", "Banana", "Cherry"]);
    let (listbox, options) = fruit_listbox(&services, &page, panel, None);

    listbox.on_button_click(&mut page.dom);
    assert!(options[2].on_click(&mut page.dom));
    assert!(!listbox.is_open());

    let mut up = KeyboardEvent::new(Key::ArrowUp);
    listbox.on_button_key_down(&mut page.dom, &mut up);
    assert!(options[2].is_active());
    assert!(options[2].is_selected());
    assert!(!options[0].is_selected());
}

#[test]
fn outside_click_dismisses_open_listbox() {
    let services = Services::default();
    let (mut page, panel) = page(&["Apple", "Cherry"]);
    let (listbox, _options) = fruit_listbox(&services, &page, panel, None);
    let mut detector = listbox.outside_detector(&services);

    listbox.on_button_click(&mut page.dom);
    detector.set_enabled(true);

    // A click that starts inside the panel never counts.
    let mut inside = PointerEvent::new(page.nodes[0]);
    detector.on_pointer_down(&inside);
    assert_eq!(detector.on_click(&page.dom, &mut inside), Verdict::Inside);
    assert!(listbox.is_open());

    let mut outside = PointerEvent::new(page.elsewhere);
    detector.on_pointer_down(&outside);
    assert_eq!(detector.on_click(&page.dom, &mut outside), Verdict::Outside);
    assert!(!listbox.is_open());
    assert!(outside.is_default_prevented());
    detector.set_enabled(false);
}

#[test]
fn menu_item_action_runs_after_close() {
    let services = Services::new(EngineConfig {
        typeahead_timeout_ms: 100,
        ..Default::default()
    });
    let (mut page, panel) = page(&["Open", "Save", "Close"]);
    let ctx = ContextProvider::new();
    let menu = Menu::create(
        MenuProps {
            button: Some(page.button),
            items: Some(panel),
            disabled: None,
        },
        &services,
        &ctx,
    )
    .unwrap();

    let observed = Arc::new(Mutex::new(Vec::new()));
    let items: Vec<MenuItem> = page
        .nodes
        .iter()
        .map(|&node| {
            let label = text_value(&page.dom, node).to_lowercase();
            let sink = observed.clone();
            let watched = menu.clone();
            let name = label.clone();
            let props = MenuItemProps {
                id: OptionId::new(&label),
                node,
                disabled: None,
                on_activate: Some(Callback::new(move |_: ()| {
                    sink.lock().unwrap().push((name.clone(), watched.is_open()));
                })),
            };
            MenuItem::create(props, &ctx, &page.dom).unwrap()
        })
        .collect();

    menu.on_button_click(&mut page.dom);
    let mut s = KeyboardEvent::new(Key::Character('s'));
    menu.on_items_key_down(&mut page.dom, &mut s);
    assert!(items[1].is_active());
    services.scheduler.advance(Duration::from_millis(100));
    assert_eq!(menu.collection().search_query(), "");

    let mut space = KeyboardEvent::new(Key::Space);
    menu.on_items_key_down(&mut page.dom, &mut space);
    assert_eq!(
        *observed.lock().unwrap(),
        vec![("save".to_string(), false)]
    );
    assert_eq!(page.dom.active_element(), Some(page.button));

    for item in items {
        item.unmount(&page.dom);
    }
    assert_eq!(menu.teardown(), 0);
}
