/// Per-texel bake state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TexelState {
    #[default]
    Unset = 0,
    /// Filled by the margin filter.
    Margin = 1,
    /// Written by a bake driver.
    Written = 2,
}

/// One state byte per texel, row-major. Lives for a single bake.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TexelMask {
    width: u32,
    height: u32,
    states: Vec<TexelState>,
}

impl TexelMask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            states: vec![TexelState::Unset; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> TexelState {
        self.states[self.index(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, state: TexelState) {
        let i = self.index(x, y);
        self.states[i] = state;
    }

    pub fn states(&self) -> &[TexelState] {
        &self.states
    }

    pub(crate) fn states_mut(&mut self) -> &mut [TexelState] {
        &mut self.states
    }

    pub fn count(&self, state: TexelState) -> usize {
        self.states.iter().filter(|&&s| s == state).count()
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}
