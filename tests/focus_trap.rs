// Focus trap scenarios: a modal dialog opened from a page button

use orbit_headless::config::Services;
use orbit_headless::dom::{Dom, FocusOptions, MemoryDom, NodeId};
use orbit_headless::events::{FocusEvent, Key, KeyboardEvent};
use orbit_headless::focus::{FocusResult, FocusTrapController, FocusTrapProps, TrapFeatures};

struct Page {
    dom: MemoryDom,
    opener: NodeId,
    elsewhere: NodeId,
    dialog: NodeId,
    fields: Vec<NodeId>,
}

fn page() -> Page {
    let mut dom = MemoryDom::new();
    let body = dom.body();
    let opener = dom.append_element(body, "button");
    let elsewhere = dom.append_element(body, "a");
    dom.set_attribute(elsewhere, "href", "#");
    let dialog = dom.append_element(body, "div");
    let name = dom.append_element(dialog, "input");
    let hidden = dom.append_element(dialog, "div");
    dom.set_attribute(hidden, "hidden", "");
    dom.append_element(hidden, "button");
    let save = dom.append_element(dialog, "button");
    let cancel = dom.append_element(dialog, "button");
    Page {
        dom,
        opener,
        elsewhere,
        dialog,
        fields: vec![name, save, cancel],
    }
}

fn focus(dom: &mut MemoryDom, node: NodeId, services: &Services) {
    let previous = dom.active_element();
    dom.focus(node, FocusOptions::default());
    services
        .history
        .on_focus(&*dom, &FocusEvent::new(node, previous));
}

#[test]
fn tab_cycles_inside_and_focus_returns_to_opener() {
    let services = Services::default();
    let mut page = page();
    focus(&mut page.dom, page.opener, &services);

    let mut trap = FocusTrapController::new(page.dialog, FocusTrapProps::default(), &services);
    trap.engage(&mut page.dom);
    assert_eq!(page.dom.active_element(), Some(page.fields[0]));

    let mut tab = KeyboardEvent::new(Key::Tab);
    assert!(trap.on_key_down(&mut page.dom, &mut tab));
    assert!(tab.is_default_prevented());
    assert_eq!(page.dom.active_element(), Some(page.fields[1]));

    trap.on_key_down(&mut page.dom, &mut KeyboardEvent::new(Key::Tab));
    trap.on_key_down(&mut page.dom, &mut KeyboardEvent::new(Key::Tab));
    assert_eq!(page.dom.active_element(), Some(page.fields[0]));

    let mut back = KeyboardEvent::new(Key::Tab).with_shift();
    trap.on_key_down(&mut page.dom, &mut back);
    assert_eq!(page.dom.active_element(), Some(page.fields[2]));

    trap.disengage(&mut page.dom);
    assert!(!trap.is_engaged());
    assert_eq!(page.dom.active_element(), Some(page.opener));
}

#[test]
fn focus_lock_pulls_focus_back() {
    let services = Services::default();
    let mut page = page();
    let mut trap = FocusTrapController::new(page.dialog, FocusTrapProps::default(), &services);
    trap.engage(&mut page.dom);
    trap.on_key_down(&mut page.dom, &mut KeyboardEvent::new(Key::Tab));
    let inside = page.fields[1];
    trap.on_focus(&mut page.dom, &FocusEvent::new(inside, Some(page.fields[0])));

    page.dom.focus(page.elsewhere, FocusOptions::default());
    let redirected = trap.on_focus(&mut page.dom, &FocusEvent::new(page.elsewhere, Some(inside)));
    assert!(redirected);
    assert_eq!(page.dom.active_element(), Some(inside));
}

#[test]
fn restore_falls_back_to_history_when_opener_is_gone() {
    let services = Services::default();
    let mut page = page();
    focus(&mut page.dom, page.elsewhere, &services);
    focus(&mut page.dom, page.opener, &services);

    let mut trap = FocusTrapController::new(page.dialog, FocusTrapProps::default(), &services);
    trap.engage(&mut page.dom);
    focus(&mut page.dom, page.fields[2], &services);

    page.dom.remove(page.opener);
    trap.disengage(&mut page.dom);
    assert_eq!(page.dom.active_element(), Some(page.elsewhere));
}

#[test]
fn sentinels_reenter_from_the_matching_end() {
    let services = Services::default();
    let mut page = page();
    let body = page.dom.body();
    let before = page.dom.append_element(body, "span");
    let after = page.dom.append_element(body, "span");
    let props = FocusTrapProps {
        sentinels: Some((before, after)),
        ..Default::default()
    };
    let mut trap = FocusTrapController::new(page.dialog, props, &services);
    trap.engage(&mut page.dom);

    // Tab off the last field lands on the trailing sentinel.
    services
        .tab_direction
        .on_key_down(&KeyboardEvent::new(Key::Tab));
    let last = page.fields[2];
    let result = trap.on_sentinel_focus(&mut page.dom, Some(last));
    assert_eq!(result, FocusResult::Success);
    assert_eq!(page.dom.active_element(), Some(page.fields[0]));

    services
        .tab_direction
        .on_key_down(&KeyboardEvent::new(Key::Tab).with_shift());
    let redirected = trap.on_focus(&mut page.dom, &FocusEvent::new(before, Some(page.fields[0])));
    assert!(redirected);
    assert_eq!(page.dom.active_element(), Some(page.fields[2]));
}

#[test]
fn trap_without_restore_leaves_focus_alone() {
    let services = Services::default();
    let mut page = page();
    focus(&mut page.dom, page.opener, &services);
    let props = FocusTrapProps {
        features: Some(TrapFeatures::INITIAL_FOCUS | TrapFeatures::TAB_LOCK),
        ..Default::default()
    };
    let mut trap = FocusTrapController::new(page.dialog, props, &services);
    trap.engage(&mut page.dom);
    trap.disengage(&mut page.dom);
    assert_eq!(page.dom.active_element(), Some(page.fields[0]));
}

#[test]
fn single_focusable_stays_pinned_on_tab() {
    let services = Services::default();
    let mut dom = MemoryDom::new();
    let body = dom.body();
    let opener = dom.append_element(body, "button");
    let dialog = dom.append_element(body, "div");
    dom.append_element(dialog, "p");
    let only = dom.append_element(dialog, "button");
    focus(&mut dom, opener, &services);

    let mut trap = FocusTrapController::new(dialog, FocusTrapProps::default(), &services);
    trap.engage(&mut dom);
    assert_eq!(dom.active_element(), Some(only));

    for shift in [false, false, true, false, true, true] {
        let mut tab = KeyboardEvent::new(Key::Tab);
        if shift {
            tab = tab.with_shift();
        }
        assert!(trap.on_key_down(&mut dom, &mut tab));
        assert!(tab.is_default_prevented());
        assert_eq!(dom.active_element(), Some(only));
    }
}
