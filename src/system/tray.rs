//! Menu bar tray: recent history, shortcut picker, quit

use crate::config::MAX_HISTORY;
use crate::core::clipboard::fanout::HistoryObserver;
use crate::core::clipboard::history::HistorySnapshot;
use crate::core::shortcut::ShortcutBinding;
use crate::shared::settings::SettingsState;
use crate::shared::types::HistoryEntry;
use tauri::menu::{Menu, MenuBuilder, MenuItem, SubmenuBuilder};
use tauri::tray::{MouseButton, MouseButtonState, TrayIcon, TrayIconBuilder, TrayIconEvent};
use tauri::{AppHandle, Manager, Runtime};

pub const TRAY_ID: &str = "macopy";

const HISTORY_ITEM_PREFIX: &str = "history_";
const QUIT_ID: &str = "quit";
const LABEL_CHARS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    English,
    Japanese,
}

impl Locale {
    /// `LANG` first, then the macOS `AppleLocale` default
    pub fn detect() -> Self {
        if let Ok(lang) = std::env::var("LANG") {
            if Self::from_tag(&lang) == Locale::Japanese {
                return Locale::Japanese;
            }
        }

        #[cfg(target_os = "macos")]
        {
            if let Ok(output) = std::process::Command::new("defaults")
                .args(["read", "-g", "AppleLocale"])
                .output()
            {
                return Self::from_tag(&String::from_utf8_lossy(&output.stdout));
            }
        }

        Locale::English
    }

    fn from_tag(tag: &str) -> Self {
        if tag.trim().to_lowercase().starts_with("ja") {
            Locale::Japanese
        } else {
            Locale::English
        }
    }

    fn shortcut_settings(self) -> &'static str {
        match self {
            Locale::English => "Shortcut Settings",
            Locale::Japanese => "ショートカット設定",
        }
    }

    fn quit(self) -> &'static str {
        match self {
            Locale::English => "Quit Macopy",
            Locale::Japanese => "Macopy を終了",
        }
    }
}

/// What a tray menu click asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayAction {
    Promote(usize),
    SwitchShortcut(ShortcutBinding),
    Quit,
}

impl TrayAction {
    pub fn from_menu_id(id: &str) -> Option<Self> {
        if id == QUIT_ID {
            return Some(TrayAction::Quit);
        }
        if let Some(index) = id.strip_prefix(HISTORY_ITEM_PREFIX) {
            return index.parse().ok().map(TrayAction::Promote);
        }
        ShortcutBinding::from_menu_id(id).map(TrayAction::SwitchShortcut)
    }
}

/// First 30 characters on one line, `...` when cut; `[Image]` for images
pub fn history_menu_label(entry: &HistoryEntry) -> String {
    match entry {
        HistoryEntry::Image(_) => "[Image]".to_string(),
        HistoryEntry::Text(content) => {
            let flat: String = content
                .chars()
                .map(|c| if c.is_control() { ' ' } else { c })
                .collect();
            let mut label: String = flat.chars().take(LABEL_CHARS).collect();
            if flat.chars().count() > LABEL_CHARS {
                label.push_str("...");
            }
            label
        }
    }
}

/// `1`..`9` then `0` for the tenth entry
pub fn history_accelerator(index: usize) -> String {
    ((index + 1) % 10).to_string()
}

fn shortcut_menu_label(binding: ShortcutBinding, active: ShortcutBinding) -> String {
    let mark = if binding == active { "✓" } else { " " };
    format!("{} {}", mark, binding.label())
}

pub fn build_menu<R: Runtime>(
    app: &AppHandle<R>,
    snapshot: &HistorySnapshot,
    shortcut: ShortcutBinding,
    locale: Locale,
) -> tauri::Result<Menu<R>> {
    let mut builder = MenuBuilder::new(app);

    for (index, entry) in snapshot.entries.iter().take(MAX_HISTORY).enumerate() {
        let item = MenuItem::with_id(
            app,
            format!("{}{}", HISTORY_ITEM_PREFIX, index),
            history_menu_label(entry),
            true,
            Some(history_accelerator(index).as_str()),
        )?;
        builder = builder.item(&item);
    }
    if !snapshot.is_empty() {
        builder = builder.separator();
    }

    let mut shortcuts = SubmenuBuilder::new(app, locale.shortcut_settings());
    for binding in ShortcutBinding::ALL {
        let item = MenuItem::with_id(
            app,
            binding.menu_id(),
            shortcut_menu_label(binding, shortcut),
            true,
            None::<&str>,
        )?;
        shortcuts = shortcuts.item(&item);
    }
    let shortcuts = shortcuts.build()?;

    let quit = MenuItem::with_id(app, QUIT_ID, locale.quit(), true, Some("CmdOrCtrl+Q"))?;

    builder.item(&shortcuts).separator().item(&quit).build()
}

/// Left button released: open the popup. The menu stays on right click.
pub fn opens_popup(button: MouseButton, state: MouseButtonState) -> bool {
    button == MouseButton::Left && state == MouseButtonState::Up
}

/// Create the tray icon. Menu clicks go to `on_action`, a left click on the
/// icon goes to `on_open`.
pub fn create_tray<R, F, G>(
    app: &AppHandle<R>,
    snapshot: &HistorySnapshot,
    shortcut: ShortcutBinding,
    visible: bool,
    on_action: F,
    on_open: G,
) -> tauri::Result<TrayIcon<R>>
where
    R: Runtime,
    F: Fn(&AppHandle<R>, TrayAction) + Send + Sync + 'static,
    G: Fn(&AppHandle<R>) + Send + Sync + 'static,
{
    let menu = build_menu(app, snapshot, shortcut, Locale::detect())?;

    let mut builder = TrayIconBuilder::with_id(TRAY_ID)
        .tooltip("Macopy")
        .menu(&menu)
        .show_menu_on_left_click(false)
        .on_menu_event(move |app, event| match TrayAction::from_menu_id(event.id.as_ref()) {
            Some(action) => on_action(app, action),
            None => log::debug!("[Tray] Unhandled menu item: {:?}", event.id),
        })
        .on_tray_icon_event(move |tray, event| {
            if let TrayIconEvent::Click {
                button,
                button_state,
                ..
            } = event
            {
                if opens_popup(button, button_state) {
                    on_open(tray.app_handle());
                }
            }
        });
    if let Some(icon) = app.default_window_icon() {
        builder = builder.icon(icon.clone());
    }

    let tray = builder.build(app)?;
    tray.set_visible(visible)?;
    Ok(tray)
}

/// Rebuilds the tray menu from every published snapshot
pub struct TrayObserver<R: Runtime> {
    app: AppHandle<R>,
    locale: Locale,
}

impl<R: Runtime> TrayObserver<R> {
    pub fn new(app: AppHandle<R>) -> Self {
        Self {
            app,
            locale: Locale::detect(),
        }
    }

    fn rebuild(&self, snapshot: &HistorySnapshot) -> tauri::Result<()> {
        let Some(tray) = self.app.tray_by_id(TRAY_ID) else {
            return Ok(());
        };
        let shortcut = self
            .app
            .try_state::<SettingsState>()
            .map(|settings| settings.get().shortcut)
            .unwrap_or_default();
        let menu = build_menu(&self.app, snapshot, shortcut, self.locale)?;
        tray.set_menu(Some(menu))
    }
}

impl<R: Runtime> HistoryObserver for TrayObserver<R> {
    fn name(&self) -> &'static str {
        "tray"
    }

    fn on_snapshot(&self, snapshot: &HistorySnapshot) {
        if let Err(e) = self.rebuild(snapshot) {
            log::error!("[Tray] Failed to rebuild menu: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_truncates_by_characters() {
        let short = HistoryEntry::Text("hello".to_string());
        assert_eq!(history_menu_label(&short), "hello");

        let exact = HistoryEntry::Text("a".repeat(30));
        assert_eq!(history_menu_label(&exact), "a".repeat(30));

        let long = HistoryEntry::Text("あ".repeat(31));
        assert_eq!(history_menu_label(&long), format!("{}...", "あ".repeat(30)));
    }

    #[test]
    fn test_label_flattens_lines_and_images() {
        let multiline = HistoryEntry::Text("fn main() {\n}".to_string());
        assert_eq!(history_menu_label(&multiline), "fn main() { }");

        let image = HistoryEntry::Image("data:image/png;base64,AAAA".to_string());
        assert_eq!(history_menu_label(&image), "[Image]");
    }

    #[test]
    fn test_accelerators() {
        let keys: Vec<String> = (0..10).map(history_accelerator).collect();
        assert_eq!(keys, vec!["1", "2", "3", "4", "5", "6", "7", "8", "9", "0"]);
    }

    #[test]
    fn test_menu_ids() {
        assert_eq!(TrayAction::from_menu_id("history_3"), Some(TrayAction::Promote(3)));
        assert_eq!(TrayAction::from_menu_id("quit"), Some(TrayAction::Quit));
        assert_eq!(
            TrayAction::from_menu_id("shortcut_cmd_shift_v"),
            Some(TrayAction::SwitchShortcut(ShortcutBinding::CommandShiftV))
        );
        assert_eq!(TrayAction::from_menu_id("history_x"), None);
        assert_eq!(TrayAction::from_menu_id("toggle_login"), None);
    }

    #[test]
    fn test_left_release_opens_popup() {
        assert!(opens_popup(MouseButton::Left, MouseButtonState::Up));
        assert!(!opens_popup(MouseButton::Left, MouseButtonState::Down));
        assert!(!opens_popup(MouseButton::Right, MouseButtonState::Up));
        assert!(!opens_popup(MouseButton::Middle, MouseButtonState::Up));
    }

    #[test]
    fn test_locale_tags() {
        assert_eq!(Locale::from_tag("ja_JP.UTF-8"), Locale::Japanese);
        assert_eq!(Locale::from_tag("ja_JP\n"), Locale::Japanese);
        assert_eq!(Locale::from_tag("en_US.UTF-8"), Locale::English);
    }
}
