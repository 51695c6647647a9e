use super::atom::Atom;
use nalgebra::Vector3;

/// One snapshot of atomic coordinates, e.g. a single optimization step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    atoms: Vec<Atom>,
}

impl Geometry {
    pub fn new(atoms: Vec<Atom>) -> Self {
        Self { atoms }
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn push(&mut self, atom: Atom) {
        self.atoms.push(atom);
    }

    /// Returns a copy of this geometry with every atom moved by `factor * displacement[i]`.
    ///
    /// The caller is responsible for passing one displacement vector per atom;
    /// surplus vectors are ignored and missing ones leave the atom in place.
    pub fn displaced(&self, displacements: &[Vector3<f64>], factor: f64) -> Self {
        let atoms = self
            .atoms
            .iter()
            .enumerate()
            .map(|(i, atom)| match displacements.get(i) {
                Some(d) => Atom {
                    element: atom.element.clone(),
                    position: atom.position + d * factor,
                },
                None => atom.clone(),
            })
            .collect();
        Self { atoms }
    }
}

impl FromIterator<Atom> for Geometry {
    fn from_iter<I: IntoIterator<Item = Atom>>(iter: I) -> Self {
        Self {
            atoms: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn water() -> Geometry {
        Geometry::new(vec![
            Atom::new("O", Point3::new(0.0, 0.0, 0.1173)),
            Atom::new("H", Point3::new(0.0, 0.7572, -0.4692)),
            Atom::new("H", Point3::new(0.0, -0.7572, -0.4692)),
        ])
    }

    #[test]
    fn displaced_moves_each_atom_along_its_vector() {
        let geom = water();
        let disp = vec![
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
        ];

        let moved = geom.displaced(&disp, 0.5);

        assert_eq!(moved.len(), 3);
        assert!((moved.atoms()[0].position.z - 0.6173).abs() < 1e-12);
        assert!((moved.atoms()[1].position.y - 1.2572).abs() < 1e-12);
        assert!((moved.atoms()[2].position.x - 0.5).abs() < 1e-12);
        assert_eq!(moved.atoms()[1].element, "H");
    }

    #[test]
    fn displaced_leaves_atoms_without_vectors_in_place() {
        let geom = water();
        let moved = geom.displaced(&[Vector3::new(1.0, 1.0, 1.0)], 1.0);
        assert_eq!(moved.atoms()[1], geom.atoms()[1]);
        assert_eq!(moved.atoms()[2], geom.atoms()[2]);
    }

    #[test]
    fn collects_from_atom_iterator() {
        let geom: Geometry = water().atoms().iter().cloned().collect();
        assert_eq!(geom, water());
        assert!(!geom.is_empty());
    }
}
