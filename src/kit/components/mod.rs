// OrbitKit headless widget families

// Popup collections
pub mod combobox;
pub mod listbox;
pub mod menu;

// Always-open collections
pub mod radio_group;
pub mod tabs;

// Re-export commonly used components
pub use combobox::{Combobox, ComboboxOption, ComboboxOptionProps, ComboboxProps};
pub use listbox::{Listbox, ListboxOption, ListboxOptionProps, ListboxProps};
pub use menu::{Menu, MenuEntry, MenuItem, MenuItemProps, MenuProps};
pub use radio_group::{Radio, RadioGroup, RadioGroupProps, RadioProps};
pub use tabs::{normalize_selected, Tab, TabPanel, TabProps, Tabs, TabsAction, TabsProps, TabsState};
