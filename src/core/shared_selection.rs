pub(crate) trait ManagedItem: Clone {
    fn id(&self) -> &str;
}

/// A lazily loaded list plus a pointer to its current entry.
///
/// The pointer is kept as a bare id so it survives list reloads: selecting an
/// id before the list arrives resolves once the list is loaded, and an id that
/// disappears from the list simply stops resolving.
pub(crate) struct SelectionState<T: ManagedItem> {
    items: Option<Vec<T>>,
    active_id: Option<String>,
    item_label: &'static str,
}

impl<T: ManagedItem> SelectionState<T> {
    pub(crate) fn new(item_label: &'static str) -> Self {
        Self {
            items: None,
            active_id: None,
            item_label,
        }
    }

    pub(crate) fn items(&self) -> Option<&[T]> {
        self.items.as_deref()
    }

    pub(crate) fn replace_items(&mut self, items: Vec<T>) {
        self.items = Some(items);
    }

    pub(crate) fn find_by_id(&self, id: &str) -> Option<&T> {
        self.items
            .as_ref()
            .and_then(|items| items.iter().find(|item| item.id() == id))
    }

    /// Insert or replace by id, keeping list order for existing entries.
    pub(crate) fn upsert(&mut self, item: T) {
        let items = self.items.get_or_insert_with(Vec::new);
        match items.iter_mut().find(|existing| existing.id() == item.id()) {
            Some(existing) => *existing = item,
            None => items.push(item),
        }
    }

    pub(crate) fn set_active(&mut self, item_id: Option<&str>) {
        self.active_id = item_id.map(str::to_owned);
    }

    pub(crate) fn get_active(&self) -> Option<&T> {
        self.active_id.as_deref().and_then(|id| self.find_by_id(id))
    }

    pub(crate) fn describe_missing(&self, item_id: &str) -> String {
        let available: Vec<&str> = self
            .items
            .iter()
            .flatten()
            .map(|item| item.id())
            .collect();
        format!(
            "{} '{}' not found. Available {}s: {}",
            self.item_label,
            item_id,
            self.item_label.to_lowercase(),
            available.join(", ")
        )
    }
}
