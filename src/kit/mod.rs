// OrbitKit: accessible widgets built on the headless engine

pub mod components;
pub mod utils;

pub use utils::Orientation;

/// Re-export of the widget families for convenience
pub mod prelude {
    pub use crate::kit::components::combobox::{Combobox, ComboboxOption};
    pub use crate::kit::components::listbox::{Listbox, ListboxOption};
    pub use crate::kit::components::menu::{Menu, MenuItem};
    pub use crate::kit::components::radio_group::{Radio, RadioGroup};
    pub use crate::kit::components::tabs::{Tab, TabPanel, Tabs};
    pub use crate::kit::utils::Orientation;
}
