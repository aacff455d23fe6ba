/// This module provides the fragment-oriented XML item reader implementation.
pub mod xml;
