use std::path::Path;

use wishes::store::JsonStore;
use wishes::{Product, ProductId, Status};

/// The loaded snapshot together with where it came from.
pub struct Model {
    store: JsonStore,
    products: Vec<Product>,
}

impl Model {
    pub fn load(store: JsonStore) -> std::io::Result<Model> {
        let products = store.load().map_err(|e| {
            std::io::Error::other(format!("Error trying to read {:?}: {e}", store.path()))
        })?;
        log::info!("Loaded {} products", products.len());
        Ok(Self { store, products })
    }

    pub fn reloaded(&self) -> std::io::Result<Model> {
        Model::load(self.store.clone())
    }

    pub fn path(&self) -> &Path {
        self.store.path()
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Flips pending and purchased for one product and writes the snapshot back.
    ///
    /// Dates are left untouched.
    pub fn toggle_status(&mut self, id: &ProductId) -> std::io::Result<Status> {
        let product = self
            .products
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| std::io::Error::other(format!("No product with id {id}")))?;
        product.status = product.status.toggled();
        let status = product.status;
        log::info!("Marked product {id} as {status}");
        self.store.save(&self.products).map_err(|e| {
            std::io::Error::other(format!("Error trying to write {:?}: {e}", self.store.path()))
        })?;
        Ok(status)
    }
}

#[cfg(test)]
mod test {
    use tempfile::tempdir;
    use wishes::store::JsonStore;
    use wishes::{Product, ProductId, Status};

    use crate::term::model::Model;

    #[test]
    fn test_toggle_status_is_saved() {
        let dir = tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("products.json"));
        store
            .save(&[Product::new("1", "Lamp", 45), Product::new("2", "Novel", 20)])
            .unwrap();

        let mut model = Model::load(store).unwrap();
        let id = ProductId::from("2");
        assert_eq!(model.toggle_status(&id).unwrap(), Status::Purchased);

        let reloaded = model.reloaded().unwrap();
        assert_eq!(reloaded.products()[0].status, Status::Pending);
        assert_eq!(reloaded.products()[1].status, Status::Purchased);
        assert!(model.toggle_status(&ProductId::from("9")).is_err());
    }

    #[test]
    fn test_invalid_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("products.json");
        std::fs::write(&path, "{").unwrap();
        let err = Model::load(JsonStore::new(&path)).err().unwrap();
        assert!(err.to_string().contains("products.json"));
    }
}
