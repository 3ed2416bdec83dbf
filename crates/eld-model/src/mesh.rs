//! Mesh data structures for the transient elastodynamics solver.
//!
//! The spatial discretization carried here is a family of 2-node bar
//! (line) elements. The time-integration core never looks inside an
//! element; it only consumes the assembled operators.

/// A node in the finite element mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Node ID (1-based)
    pub id: i32,
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
    /// Z coordinate
    pub z: f64,
}

impl Node {
    /// Create a new node
    pub fn new(id: i32, x: f64, y: f64, z: f64) -> Self {
        Self { id, x, y, z }
    }

    /// Get coordinates as an array
    pub fn coords(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Euclidean distance to another node
    pub fn distance_to(&self, other: &Node) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// A 2-node bar element
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Element ID (1-based)
    pub id: i32,
    /// Node connectivity (node IDs)
    pub nodes: [i32; 2],
    /// Cross-sectional area
    pub area: f64,
}

impl Element {
    /// Create a new bar element
    pub fn new(id: i32, nodes: [i32; 2], area: f64) -> Self {
        Self { id, nodes, area }
    }

    /// Validate element data
    pub fn validate(&self) -> Result<(), String> {
        if self.nodes[0] == self.nodes[1] {
            return Err(format!(
                "Element {} connects node {} to itself",
                self.id, self.nodes[0]
            ));
        }
        if self.area <= 0.0 {
            return Err(format!(
                "Element {} has non-positive area {}",
                self.id, self.area
            ));
        }
        Ok(())
    }
}

/// Complete finite element mesh
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    /// All nodes, in insertion order
    pub nodes: Vec<Node>,
    /// All elements, in insertion order
    pub elements: Vec<Element>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the mesh
    pub fn add_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// Add an element to the mesh
    pub fn add_element(&mut self, element: Element) -> Result<(), String> {
        element.validate()?;
        self.elements.push(element);
        Ok(())
    }

    /// Get a node by ID
    pub fn get_node(&self, id: i32) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Zero-based index of a node ID in the node list
    pub fn node_index(&self, id: i32) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    /// Length of an element (distance between its end nodes)
    pub fn element_length(&self, element: &Element) -> Result<f64, String> {
        let a = self
            .get_node(element.nodes[0])
            .ok_or_else(|| format!("Element {} references missing node {}", element.id, element.nodes[0]))?;
        let b = self
            .get_node(element.nodes[1])
            .ok_or_else(|| format!("Element {} references missing node {}", element.id, element.nodes[1]))?;
        Ok(a.distance_to(b))
    }

    /// Validate the mesh
    pub fn validate(&self) -> Result<(), String> {
        for element in &self.elements {
            for &node_id in &element.nodes {
                if self.get_node(node_id).is_none() {
                    return Err(format!(
                        "Element {} references non-existent node {}",
                        element.id, node_id
                    ));
                }
            }
            let length = self.element_length(element)?;
            if length <= 0.0 {
                return Err(format!("Element {} has zero length", element.id));
            }
        }
        Ok(())
    }

    /// Get mesh statistics
    pub fn statistics(&self) -> MeshStatistics {
        let total_length = self
            .elements
            .iter()
            .filter_map(|e| self.element_length(e).ok())
            .sum();
        MeshStatistics {
            num_nodes: self.nodes.len(),
            num_elements: self.elements.len(),
            total_length,
        }
    }
}

/// Mesh statistics for reporting
#[derive(Debug, Clone)]
pub struct MeshStatistics {
    /// Total number of nodes
    pub num_nodes: usize,
    /// Total number of elements
    pub num_elements: usize,
    /// Summed element length
    pub total_length: f64,
}

/// Builds structured meshes for common geometries
pub struct MeshBuilder;

impl MeshBuilder {
    /// Build a uniform 1-D bar mesh on [0, length] along the x axis.
    ///
    /// Produces `num_elements + 1` nodes and `num_elements` bar elements
    /// with the given cross-sectional area.
    pub fn interval(length: f64, num_elements: usize, area: f64) -> Result<Mesh, String> {
        if length <= 0.0 {
            return Err(format!("Bar length must be positive, got {}", length));
        }
        if num_elements == 0 {
            return Err("At least one element is required".to_string());
        }
        if area <= 0.0 {
            return Err(format!("Cross-sectional area must be positive, got {}", area));
        }

        let mut mesh = Mesh::new();
        let h = length / num_elements as f64;
        for i in 0..=num_elements {
            mesh.add_node(Node::new(i as i32 + 1, i as f64 * h, 0.0, 0.0));
        }
        for i in 0..num_elements {
            mesh.add_element(Element::new(i as i32 + 1, [i as i32 + 1, i as i32 + 2], area))?;
        }
        mesh.validate()?;
        Ok(mesh)
    }
}
