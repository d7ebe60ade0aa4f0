pub mod vole_psi;

pub use vole_psi::PsiParams;

/// Private set intersection sender.
pub type Sender<V> = vole_psi::Sender<V>;
/// Private set intersection receiver.
pub type Receiver<V> = vole_psi::Receiver<V>;
