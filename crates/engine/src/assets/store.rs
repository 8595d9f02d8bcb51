use crate::render::Surface;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImageId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SoundId(pub usize);

/// Owns every decoded image; the simulation only passes ids around.
#[derive(Debug, Clone, Default)]
pub struct ImageStore {
    images: Vec<Surface>,
}

impl ImageStore {
    pub fn insert(&mut self, surface: Surface) -> ImageId {
        self.images.push(surface);
        ImageId(self.images.len() - 1)
    }

    pub fn get(&self, id: ImageId) -> Option<&Surface> {
        self.images.get(id.0)
    }

    pub fn size_of(&self, id: ImageId) -> Option<(i32, i32)> {
        self.get(id).map(Surface::size)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_sequential_and_resolve() {
        let mut store = ImageStore::default();
        let a = store.insert(Surface::new(2, 3));
        let b = store.insert(Surface::new(5, 1));
        assert_eq!((a, b), (ImageId(0), ImageId(1)));
        assert_eq!(store.size_of(b), Some((5, 1)));
        assert_eq!(store.size_of(ImageId(7)), None);
    }
}
