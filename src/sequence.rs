use crate::error::Result;

/// Positional access shared by [`LinkedList`](crate::linked::LinkedList) and
/// [`TreeList`](crate::index_tree::TreeList).
///
/// Indices are ordinal positions. Reads and removals require
/// `index < len`; insertion also accepts `index == len` (append).
pub trait Sequence<T> {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        return self.len() == 0;
    }

    fn get(&self, index: usize) -> Result<&T>;

    /// Replaces the element at `index`, returning the old one.
    fn set(&mut self, index: usize, value: T) -> Result<T>;

    fn insert(&mut self, index: usize, value: T) -> Result<()>;

    fn remove(&mut self, index: usize) -> Result<T>;

    fn clear(&mut self);

    /// Appends to the end. Cannot fail.
    fn push(&mut self, value: T);

    /// Position of the first element equal to `value`.
    fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq;

    fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        return self.index_of(value).is_some();
    }
}

impl<T> Sequence<T> for Vec<T> {
    fn len(&self) -> usize { Vec::len(self) }

    fn get(&self, index: usize) -> Result<&T> {
        crate::error::check_element_index(index, Vec::len(self))?;
        Ok(&self[index])
    }

    fn set(&mut self, index: usize, value: T) -> Result<T> {
        crate::error::check_element_index(index, Vec::len(self))?;
        Ok(std::mem::replace(&mut self[index], value))
    }

    fn insert(&mut self, index: usize, value: T) -> Result<()> {
        crate::error::check_position_index(index, Vec::len(self))?;
        Vec::insert(self, index, value);
        Ok(())
    }

    fn remove(&mut self, index: usize) -> Result<T> {
        crate::error::check_element_index(index, Vec::len(self))?;
        Ok(Vec::remove(self, index))
    }

    fn clear(&mut self) { Vec::clear(self) }

    fn push(&mut self, value: T) { Vec::push(self, value) }

    fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.iter().position(|item| item == value)
    }
}
