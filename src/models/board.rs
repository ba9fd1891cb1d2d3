use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Board {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<BoardColumn>,
    #[serde(default)]
    pub items_page: Option<ItemsPage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoardColumn {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemsPage {
    #[serde(default)]
    pub items: Vec<BoardItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoardItem {
    pub name: String,
    #[serde(default)]
    pub column_values: Vec<ColumnValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnValue {
    pub id: String,
    pub text: Option<String>,
}

impl Board {
    pub fn items(&self) -> &[BoardItem] {
        self.items_page
            .as_ref()
            .map(|page| page.items.as_slice())
            .unwrap_or(&[])
    }

    /// Text of the first column of `item` whose title is one of `titles`.
    pub fn column_text(&self, item: &BoardItem, titles: &[&str]) -> Option<String> {
        item.column_values.iter().find_map(|value| {
            let column = self.columns.iter().find(|c| c.id == value.id)?;
            if titles.contains(&column.title.as_str()) {
                Some(value.text.clone().unwrap_or_default())
            } else {
                None
            }
        })
    }
}
