/// Endless reader over a fixed set of recorded elements. Once the last
/// element is returned, reading wraps around to the first one.
#[derive(Clone, Debug)]
pub struct CircularReader<T: Clone> {
    buffer: Vec<T>,
    index: usize,
}

impl<T: Clone> CircularReader<T> {
    /// Returns an error if `data` is empty.
    pub fn new(data: Vec<T>) -> Result<Self, String> {
        if data.is_empty() {
            return Err("Buffer cannot be empty".to_string());
        }
        Ok(Self {
            buffer: data,
            index: 0,
        })
    }

    pub fn next_element(&mut self) -> T {
        let elem = self.buffer[self.index].clone();
        self.index = (self.index + 1) % self.buffer.len();
        elem
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn rewind(&mut self) {
        self.index = 0;
    }
}

impl<T: Clone> TryFrom<Vec<T>> for CircularReader<T> {
    type Error = String;
    fn try_from(value: Vec<T>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_around() {
        let data = vec![[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let mut reader = CircularReader::new(data.clone()).unwrap();

        for i in 0..5 {
            assert_eq!(reader.next_element(), data[i % data.len()]);
        }
    }

    #[test]
    fn test_rewind() {
        let mut reader = CircularReader::try_from(vec![10, 20, 30]).unwrap();
        reader.next_element();
        reader.next_element();
        reader.rewind();
        assert_eq!(reader.next_element(), 10);
        assert_eq!(reader.len(), 3);
    }

    #[test]
    fn test_empty_is_rejected() {
        assert!(CircularReader::<i32>::new(vec![]).is_err());
    }
}
